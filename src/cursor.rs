//! Character cursor over a source unit.
//!
//! Tracks line, column, and byte offset, and owns the accumulation buffer
//! the lexer fills while scanning composite lexemes.

use crate::token::Position;

const BOM: &str = "\u{FEFF}";

pub struct SourceCursor<'a> {
    source: &'a str,
    pos: Position,
    buffer: String,
}

impl<'a> SourceCursor<'a> {
    /// Create a cursor at the start of `source`, past any byte-order mark.
    ///
    /// The mark is skipped without advancing the column.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let offset = if source.starts_with(BOM) { BOM.len() } else { 0 };
        Self {
            source,
            pos: Position::new(1, 1, offset),
            buffer: String::new(),
        }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    /// Remember the current position so scanning can back out of a
    /// speculative match.
    #[must_use]
    pub const fn mark(&self) -> Position {
        self.pos
    }

    pub const fn restore(&mut self, mark: Position) {
        self.pos = mark;
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character after [`peek`](Self::peek).
    #[must_use]
    pub fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    /// Consume one character.
    ///
    /// A newline sequence (`\n`, `\r`, or `\r\n`) is consumed whole, counts
    /// as one line, and is returned as `'\n'`.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos.offset += ch.len_utf8();
        match ch {
            '\r' => {
                if self.peek() == Some('\n') {
                    self.pos.offset += 1;
                }
                self.new_line();
                Some('\n')
            }
            '\n' => {
                self.new_line();
                Some('\n')
            }
            _ => {
                self.pos.column += 1;
                Some(ch)
            }
        }
    }

    /// Consume the current character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    const fn new_line(&mut self) {
        self.pos.line += 1;
        self.pos.column = 1;
    }

    /// Consume the current character and append it to the buffer.
    pub fn save_and_advance(&mut self) {
        if let Some(ch) = self.advance() {
            self.buffer.push(ch);
        }
    }

    pub fn save(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    /// Hand out the accumulated text, leaving a fresh buffer behind.
    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Raw source text between `start` and the current position.
    #[must_use]
    pub fn slice_from(&self, start: Position) -> &'a str {
        &self.source[start.offset..self.pos.offset]
    }
}
