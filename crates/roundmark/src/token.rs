//! Lexical tokens produced by the lexer

use std::fmt;

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Run of characters with no structural meaning
    Text,
    Star,
    Underscore,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Backtick,
    Bang,
    Dash,
    Hash,
    Newline,
    /// Ordered list marker at the start of a line, e.g. `12.` or `3)`
    OlMarker,
    /// End of input, always the last token
    Eof,
}

impl TokenKind {
    /// Kind of a single structural character, if it is one
    pub fn structural(c: char) -> Option<Self> {
        let kind = match c {
            '#' => Self::Hash,
            '*' => Self::Star,
            '_' => Self::Underscore,
            '[' => Self::LBracket,
            ']' => Self::RBracket,
            '(' => Self::LParen,
            ')' => Self::RParen,
            '`' => Self::Backtick,
            '!' => Self::Bang,
            '-' => Self::Dash,
            '\n' => Self::Newline,
            _ => return None,
        };
        Some(kind)
    }
}

/// 1-based source position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A lexical unit with its exact source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Text token made only of spaces and tabs
    pub fn is_blank_text(&self) -> bool {
        self.kind == TokenKind::Text && self.lexeme.chars().all(|c| c == ' ' || c == '\t')
    }
}

/// Concatenate the lexemes of `tokens`
pub fn source_text(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.lexeme.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_chars() {
        assert_eq!(TokenKind::structural('#'), Some(TokenKind::Hash));
        assert_eq!(TokenKind::structural('\n'), Some(TokenKind::Newline));
        assert_eq!(TokenKind::structural('a'), None);
        assert_eq!(TokenKind::structural('.'), None);
    }

    #[test]
    fn test_blank_text() {
        let pos = Pos::new(1, 1);
        assert!(Token::new(TokenKind::Text, " \t ", pos).is_blank_text());
        assert!(!Token::new(TokenKind::Text, " x", pos).is_blank_text());
        assert!(!Token::new(TokenKind::Dash, "-", pos).is_blank_text());
    }

    #[test]
    fn test_pos_display() {
        assert_eq!(Pos::new(3, 14).to_string(), "3:14");
    }
}
