use std::fmt;

/// A point in the source text.
///
/// `line` and `column` are 1-based; `offset` is the 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    /// The position of the first character of a source unit.
    pub const START: Self = Self {
        line: 1,
        column: 1,
        offset: 0,
    };

    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Source extent of a token or AST node, start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `at`.
    #[must_use]
    pub const fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Span running from the start of `first` to the end of `last`.
    #[must_use]
    pub const fn between(first: Self, last: Self) -> Self {
        Self {
            start: first.start,
            end: last.end,
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.offset == self.end.offset
    }
}

/// The closed alphabet the grammar is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    // Keywords.
    And,
    Break,
    Do,
    Else,
    Elseif,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,

    // Punctuation.
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Hash,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Assign,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    DoubleColon,
    Semicolon,
    Colon,
    Comma,
    Dot,
    Concat,
    Ellipsis,

    // Literal categories.
    Number,
    String,
    Identifier,

    // Markers.
    Eof,
}

/// Static keyword table, looked up once per scanned word.
pub const KEYWORDS: [(&str, Symbol); 22] = [
    ("and", Symbol::And),
    ("break", Symbol::Break),
    ("do", Symbol::Do),
    ("else", Symbol::Else),
    ("elseif", Symbol::Elseif),
    ("end", Symbol::End),
    ("false", Symbol::False),
    ("for", Symbol::For),
    ("function", Symbol::Function),
    ("goto", Symbol::Goto),
    ("if", Symbol::If),
    ("in", Symbol::In),
    ("local", Symbol::Local),
    ("nil", Symbol::Nil),
    ("not", Symbol::Not),
    ("or", Symbol::Or),
    ("repeat", Symbol::Repeat),
    ("return", Symbol::Return),
    ("then", Symbol::Then),
    ("true", Symbol::True),
    ("until", Symbol::Until),
    ("while", Symbol::While),
];

impl Symbol {
    /// Look up a scanned word in the keyword table.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == word)
            .map(|&(_, symbol)| symbol)
    }

    #[must_use]
    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|&(_, symbol)| symbol == self)
    }

    /// Printable form used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Break => "break",
            Self::Do => "do",
            Self::Else => "else",
            Self::Elseif => "elseif",
            Self::End => "end",
            Self::False => "false",
            Self::For => "for",
            Self::Function => "function",
            Self::Goto => "goto",
            Self::If => "if",
            Self::In => "in",
            Self::Local => "local",
            Self::Nil => "nil",
            Self::Not => "not",
            Self::Or => "or",
            Self::Repeat => "repeat",
            Self::Return => "return",
            Self::Then => "then",
            Self::True => "true",
            Self::Until => "until",
            Self::While => "while",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::Hash => "#",
            Self::Equal => "==",
            Self::NotEqual => "~=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Assign => "=",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::DoubleColon => "::",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Concat => "..",
            Self::Ellipsis => "...",
            Self::Number => "<number>",
            Self::String => "<string>",
            Self::Identifier => "<name>",
            Self::Eof => "<eof>",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token with its symbol, source extent, and decoded text.
///
/// Only identifiers, strings, and numbers carry a lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    pub span: Span,
    pub lexeme: Option<String>,
}

impl Token {
    #[must_use]
    pub const fn new(symbol: Symbol, span: Span) -> Self {
        Self {
            symbol,
            span,
            lexeme: None,
        }
    }

    #[must_use]
    pub const fn with_lexeme(symbol: Symbol, span: Span, lexeme: String) -> Self {
        Self {
            symbol,
            span,
            lexeme: Some(lexeme),
        }
    }

    /// Text shown after `near` in diagnostics.
    #[must_use]
    pub fn text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or_else(|| self.symbol.as_str())
    }
}
