use std::fmt;

use crate::cursor::SourceCursor;
use crate::token::{Position, Span, Symbol, Token};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Short string cut off by a raw newline or end of input.
    UnfinishedString { near: String },
    /// `[[ ... ` never closed.
    UnfinishedLongString,
    /// `--[[ ... ` never closed.
    UnfinishedLongComment,
    /// `[=` not followed by more `=` and then `[`.
    InvalidLongDelimiter { near: String },
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
    /// `\ddd` above 255.
    EscapeTooLarge { near: String },
    /// `\x` not followed by two hex digits.
    HexDigitExpected { near: String },
}

impl LexErrorKind {
    /// Stable numeric code for tooling.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::UnfinishedString { .. } => 101,
            Self::UnfinishedLongString => 102,
            Self::UnfinishedLongComment => 103,
            Self::InvalidLongDelimiter { .. } => 104,
            Self::UnexpectedCharacter(_) => 105,
            Self::EscapeTooLarge { .. } => 106,
            Self::HexDigitExpected { .. } => 107,
        }
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnfinishedString { near } => {
                write!(f, "unfinished string near '{near}'")
            }
            Self::UnfinishedLongString => {
                write!(f, "unfinished long string near '<eof>'")
            }
            Self::UnfinishedLongComment => {
                write!(f, "unfinished long comment near '<eof>'")
            }
            Self::InvalidLongDelimiter { near } => {
                write!(f, "invalid long string delimiter near '{near}'")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected symbol near '{ch}'")
            }
            Self::EscapeTooLarge { near } => {
                write!(f, "decimal escape too large near '{near}'")
            }
            Self::HexDigitExpected { near } => {
                write!(f, "hexadecimal digit expected near '{near}'")
            }
        }
    }
}

/// Error produced during lexing, positioned where scanning stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (line {}, column {})", span.start.line, span.start.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize a whole source string, up to and including the `Eof` token.
///
/// # Errors
///
/// Returns the first `LexError`; lexing does not recover.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).collect()
}

/// Pull-based tokenizer over a single source unit.
///
/// Whitespace, newlines, and comments never surface as tokens. Once the
/// input is exhausted every call to [`next_token`](Self::next_token) yields
/// `Eof`.
pub struct Lexer<'a> {
    cursor: SourceCursor<'a>,
    done: bool,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            cursor: SourceCursor::new(input),
            done: false,
        }
    }

    /// Skip a leading `#` line, as script loaders do for `#!` lines.
    #[must_use]
    pub fn skip_shebang(mut self) -> Self {
        if self.cursor.position().offset <= 3 && self.cursor.peek() == Some('#') {
            while self.cursor.peek().is_some_and(|c| !is_newline(c)) {
                self.cursor.advance();
            }
        }
        self
    }

    /// Scan the next token.
    ///
    /// # Errors
    ///
    /// Returns `LexError` on unfinished strings or comments, invalid long
    /// bracket delimiters, bad escapes, or unknown characters.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.scan()?;
        log::trace!("{} at {}", token.text(), token.span.start);
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        loop {
            let start = self.cursor.position();
            let Some(ch) = self.cursor.peek() else {
                return Ok(Token::new(Symbol::Eof, Span::empty(start)));
            };

            match ch {
                ' ' | '\t' | '\u{0B}' | '\u{0C}' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '-' => {
                    self.cursor.advance();
                    if self.cursor.eat('-') {
                        self.skip_comment()?;
                    } else {
                        return Ok(self.make(Symbol::Minus, start));
                    }
                }
                '[' => return self.read_bracket(start),
                '=' => return Ok(self.one_or_two('=', Symbol::Assign, Symbol::Equal, start)),
                '<' => return Ok(self.one_or_two('=', Symbol::Less, Symbol::LessEqual, start)),
                '>' => {
                    return Ok(self.one_or_two('=', Symbol::Greater, Symbol::GreaterEqual, start));
                }
                ':' => {
                    return Ok(self.one_or_two(':', Symbol::Colon, Symbol::DoubleColon, start));
                }
                '~' => {
                    self.cursor.advance();
                    if self.cursor.eat('=') {
                        return Ok(self.make(Symbol::NotEqual, start));
                    }
                    return Err(self.error(LexErrorKind::UnexpectedCharacter('~')));
                }
                '.' => {
                    if self.cursor.peek_second().is_some_and(|c| c.is_ascii_digit()) {
                        return Ok(self.read_number(start));
                    }
                    self.cursor.advance();
                    if self.cursor.eat('.') {
                        if self.cursor.eat('.') {
                            return Ok(self.make(Symbol::Ellipsis, start));
                        }
                        return Ok(self.make(Symbol::Concat, start));
                    }
                    return Ok(self.make(Symbol::Dot, start));
                }
                '"' | '\'' => return self.read_string(ch, start),
                c if c.is_ascii_digit() => return Ok(self.read_number(start)),
                c if is_name_start(c) => return Ok(self.read_name(start)),
                _ => {
                    let Some(symbol) = single_char_symbol(ch) else {
                        return Err(self.error(LexErrorKind::UnexpectedCharacter(ch)));
                    };
                    self.cursor.advance();
                    return Ok(self.make(symbol, start));
                }
            }
        }
    }

    const fn make(&self, symbol: Symbol, start: Position) -> Token {
        Token::new(symbol, Span::new(start, self.cursor.position()))
    }

    fn make_with_lexeme(&self, symbol: Symbol, start: Position, lexeme: String) -> Token {
        Token::with_lexeme(symbol, Span::new(start, self.cursor.position()), lexeme)
    }

    const fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            span: Span::empty(self.cursor.position()),
        }
    }

    /// `=` vs `==`, `<` vs `<=`, `:` vs `::` and friends.
    fn one_or_two(&mut self, second: char, short: Symbol, long: Symbol, start: Position) -> Token {
        self.cursor.advance();
        if self.cursor.eat(second) {
            self.make(long, start)
        } else {
            self.make(short, start)
        }
    }

    /// Called with `--` already consumed.
    fn skip_comment(&mut self) -> Result<(), LexError> {
        if self.cursor.peek() == Some('[') {
            let mark = self.cursor.mark();
            if let Ok(level) = self.open_long_bracket() {
                self.read_long_bracket(level, LexErrorKind::UnfinishedLongComment)?;
                self.cursor.clear_buffer();
                return Ok(());
            }
            self.cursor.restore(mark);
        }

        while self.cursor.peek().is_some_and(|c| !is_newline(c)) {
            self.cursor.advance();
        }
        Ok(())
    }

    fn read_bracket(&mut self, start: Position) -> Result<Token, LexError> {
        let mark = self.cursor.mark();
        match self.open_long_bracket() {
            Ok(level) => {
                let value = self.read_long_bracket(level, LexErrorKind::UnfinishedLongString)?;
                Ok(self.make_with_lexeme(Symbol::String, start, value))
            }
            Err(0) => {
                self.cursor.restore(mark);
                self.cursor.advance();
                Ok(self.make(Symbol::LeftBracket, start))
            }
            Err(_) => Err(self.error(LexErrorKind::InvalidLongDelimiter {
                near: self.cursor.slice_from(start).to_string(),
            })),
        }
    }

    /// Consume `[`, any run of `=`, and the second `[`.
    ///
    /// Returns the level (number of `=`) on success, or the number of `=`
    /// seen before the sequence broke off.
    fn open_long_bracket(&mut self) -> Result<usize, usize> {
        self.cursor.advance();
        let mut level = 0;
        while self.cursor.eat('=') {
            level += 1;
        }
        if self.cursor.eat('[') {
            Ok(level)
        } else {
            Err(level)
        }
    }

    /// Read the body of a long bracket up to the closer of the same level.
    fn read_long_bracket(
        &mut self,
        level: usize,
        unfinished: LexErrorKind,
    ) -> Result<String, LexError> {
        // A newline right after the opener is not part of the body.
        if self.cursor.peek().is_some_and(is_newline) {
            self.cursor.advance();
        }

        loop {
            match self.cursor.peek() {
                None => return Err(self.error(unfinished)),
                Some(']') => {
                    self.cursor.advance();
                    let mut count = 0;
                    while self.cursor.eat('=') {
                        count += 1;
                    }
                    if count == level && self.cursor.eat(']') {
                        return Ok(self.cursor.take_buffer());
                    }
                    // Not our closer; the next `]` (if any) is looked at
                    // again as the start of a new candidate.
                    self.cursor.save(']');
                    for _ in 0..count {
                        self.cursor.save('=');
                    }
                }
                Some(_) => self.cursor.save_and_advance(),
            }
        }
    }

    fn read_string(&mut self, quote: char, start: Position) -> Result<Token, LexError> {
        self.cursor.advance();

        loop {
            match self.cursor.peek() {
                None => {
                    self.cursor.clear_buffer();
                    return Err(self.error(LexErrorKind::UnfinishedString {
                        near: Symbol::Eof.as_str().to_string(),
                    }));
                }
                Some(c) if is_newline(c) => {
                    self.cursor.clear_buffer();
                    return Err(self.error(LexErrorKind::UnfinishedString {
                        near: self.cursor.slice_from(start).to_string(),
                    }));
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.read_escape()?;
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    break;
                }
                Some(_) => self.cursor.save_and_advance(),
            }
        }

        let value = self.cursor.take_buffer();
        Ok(self.make_with_lexeme(Symbol::String, start, value))
    }

    /// Decode one escape; the backslash is already consumed.
    fn read_escape(&mut self) -> Result<(), LexError> {
        let Some(ch) = self.cursor.peek() else {
            self.cursor.clear_buffer();
            return Err(self.error(LexErrorKind::UnfinishedString {
                near: Symbol::Eof.as_str().to_string(),
            }));
        };

        let decoded = match ch {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '\r' | '\n' => '\n',
            'x' => return self.read_hex_escape(),
            c if c.is_ascii_digit() => return self.read_decimal_escape(),
            other => other,
        };
        self.cursor.advance();
        self.cursor.save(decoded);
        Ok(())
    }

    fn read_decimal_escape(&mut self) -> Result<(), LexError> {
        let mut digits = String::new();
        while digits.len() < 3 {
            match self.cursor.peek() {
                Some(d) if d.is_ascii_digit() => {
                    digits.push(d);
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        match digits.parse::<u8>() {
            Ok(byte) => {
                self.cursor.save(char::from(byte));
                Ok(())
            }
            Err(_) => {
                self.cursor.clear_buffer();
                Err(self.error(LexErrorKind::EscapeTooLarge {
                    near: format!("\\{digits}"),
                }))
            }
        }
    }

    fn read_hex_escape(&mut self) -> Result<(), LexError> {
        self.cursor.advance();
        let mut seen = String::from("\\x");
        let mut value: u8 = 0;
        for _ in 0..2 {
            let digit = self.cursor.peek().and_then(|c| c.to_digit(16));
            let Some(digit) = digit else {
                if let Some(c) = self.cursor.peek().filter(|&c| !is_newline(c)) {
                    seen.push(c);
                }
                self.cursor.clear_buffer();
                return Err(self.error(LexErrorKind::HexDigitExpected { near: seen }));
            };
            if let Some(c) = self.cursor.advance() {
                seen.push(c);
            }
            // Two hex digits always fit in a byte.
            value = value * 16 + u8::try_from(digit).unwrap_or_default();
        }
        self.cursor.save(char::from(value));
        Ok(())
    }

    /// Accumulate a numeric lexeme; validation happens in the parser.
    fn read_number(&mut self, start: Position) -> Token {
        let hex = self.cursor.peek() == Some('0')
            && matches!(self.cursor.peek_second(), Some('x' | 'X'));
        if hex {
            self.cursor.save_and_advance();
            self.cursor.save_and_advance();
        }
        let exponent_marks: [char; 2] = if hex { ['p', 'P'] } else { ['e', 'E'] };

        let mut seen_dot = false;
        let mut seen_exponent = false;
        while let Some(c) = self.cursor.peek() {
            if exponent_marks.contains(&c) && !seen_exponent {
                seen_exponent = true;
                self.cursor.save_and_advance();
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.save_and_advance();
                }
            } else if c == '.' && !seen_dot && !seen_exponent {
                seen_dot = true;
                self.cursor.save_and_advance();
            } else if (hex && !seen_exponent && c.is_ascii_hexdigit()) || c.is_ascii_digit() {
                self.cursor.save_and_advance();
            } else {
                break;
            }
        }

        // Glued name characters stay in the lexeme so the parser can
        // report the whole thing as malformed.
        while self.cursor.peek().is_some_and(is_name_continue) {
            self.cursor.save_and_advance();
        }

        let lexeme = self.cursor.take_buffer();
        self.make_with_lexeme(Symbol::Number, start, lexeme)
    }

    fn read_name(&mut self, start: Position) -> Token {
        while self.cursor.peek().is_some_and(is_name_continue) {
            self.cursor.save_and_advance();
        }
        let word = self.cursor.take_buffer();
        match Symbol::keyword(&word) {
            Some(keyword) => self.make(keyword, start),
            None => self.make_with_lexeme(Symbol::Identifier, start, word),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_token();
        self.done = match &result {
            Ok(token) => token.symbol == Symbol::Eof,
            Err(_) => true,
        };
        Some(result)
    }
}

const fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

const fn single_char_symbol(c: char) -> Option<Symbol> {
    let symbol = match c {
        '+' => Symbol::Plus,
        '*' => Symbol::Star,
        '/' => Symbol::Slash,
        '%' => Symbol::Percent,
        '^' => Symbol::Caret,
        '#' => Symbol::Hash,
        '(' => Symbol::LeftParen,
        ')' => Symbol::RightParen,
        '{' => Symbol::LeftBrace,
        '}' => Symbol::RightBrace,
        ']' => Symbol::RightBracket,
        ';' => Symbol::Semicolon,
        ',' => Symbol::Comma,
        _ => return None,
    };
    Some(symbol)
}
