//! Lexer: character stream to positioned tokens
//!
//! The lexer reads UTF-8 from any [`std::io::Read`], one char at a time, and
//! emits single-character structural tokens, ordered list markers at the start
//! of a line, and `Text` runs for everything else. A backslash followed by an
//! inline special char stays inside the text run together with that char.
//! Lexemes are exact source slices, so joining them gives back the input.

use std::io::{self, BufReader, Bytes, Read};

use roundmark_core::escape::is_inline_special;

use crate::cancel::Cancellation;
use crate::token::{Pos, Token, TokenKind};
use crate::{Interrupted, Result};

/// Options for the lexer
#[derive(Debug, Clone)]
pub struct LexerOptions {
    /// Indent counted for a tab at the start of a line
    pub tab_width: usize,

    /// Deepest indent at which a digit run can still start an ordered list marker
    pub max_marker_indent: usize,

    /// Chars between full cancellation checks (flag and deadline).
    /// The flag alone is checked before every char.
    pub poll_interval: usize,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            tab_width: 2,
            max_marker_indent: 3,
            poll_interval: 1024,
        }
    }
}

/// Markdown lexer
#[derive(Debug, Clone, Default)]
pub struct Lexer {
    options: LexerOptions,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LexerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    /// Tokenize everything `reader` yields.
    ///
    /// On cancellation or a read failure the tokens lexed so far come back
    /// inside the error. The returned tokens always end with `Eof`.
    pub fn tokenize<R: Read>(
        &self,
        reader: R,
        cancel: &Cancellation,
    ) -> std::result::Result<Vec<Token>, Interrupted<Vec<Token>>> {
        let mut scan = Scan::new(&self.options, cancel, reader);

        match scan.run() {
            Ok(()) => {
                log::debug!("Lexed {} tokens over {} lines", scan.tokens.len(), scan.line);
                Ok(scan.tokens)
            }
            Err(error) => {
                scan.flush_text();
                log::debug!(
                    "Lexing stopped at {}:{} after {} tokens: {}",
                    scan.line,
                    scan.col,
                    scan.tokens.len(),
                    error
                );
                Err(Interrupted::new(scan.tokens, error))
            }
        }
    }
}

/// UTF-8 decoder over a byte reader with one char of pushback
struct CharReader<R: Read> {
    bytes: Bytes<BufReader<R>>,
    pending: Option<char>,
}

impl<R: Read> CharReader<R> {
    fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            pending: None,
        }
    }

    fn next_char(&mut self) -> io::Result<Option<char>> {
        if let Some(c) = self.pending.take() {
            return Ok(Some(c));
        }

        let first = match self.bytes.next() {
            Some(byte) => byte?,
            None => return Ok(None),
        };
        let width = utf8_width(first).ok_or_else(invalid_utf8)?;

        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.bytes.next().ok_or_else(invalid_utf8)??;
        }

        let decoded = std::str::from_utf8(&buf[..width]).map_err(|_| invalid_utf8())?;
        Ok(decoded.chars().next())
    }

    fn unread(&mut self, c: char) {
        self.pending = Some(c);
    }
}

fn utf8_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}

/// Per-call lexing state
struct Scan<'a, R: Read> {
    options: &'a LexerOptions,
    cancel: &'a Cancellation,
    chars: CharReader<R>,
    tokens: Vec<Token>,
    text: String,
    text_pos: Pos,
    line: usize,
    /// Column of the last char read, 0 before the first char of a line
    col: usize,
    at_line_start: bool,
    indent: usize,
}

impl<'a, R: Read> Scan<'a, R> {
    fn new(options: &'a LexerOptions, cancel: &'a Cancellation, reader: R) -> Self {
        Self {
            options,
            cancel,
            chars: CharReader::new(reader),
            tokens: Vec::new(),
            text: String::new(),
            text_pos: Pos::new(1, 1),
            line: 1,
            col: 0,
            at_line_start: true,
            indent: 0,
        }
    }

    fn run(&mut self) -> Result<()> {
        let interval = self.options.poll_interval.max(1);
        let mut iteration = 0usize;

        loop {
            if iteration % interval == 0 {
                self.cancel.check()?;
            }
            iteration += 1;

            let Some(c) = self.read()? else {
                break;
            };

            if self.at_line_start && (c == ' ' || c == '\t') {
                self.indent += if c == '\t' { self.options.tab_width } else { 1 };
                self.push_text(c, self.here());
                continue;
            }

            if self.at_line_start
                && self.indent <= self.options.max_marker_indent
                && c.is_ascii_digit()
            {
                self.lex_marker(c)?;
                self.at_line_start = false;
                self.indent = 0;
                continue;
            }

            self.at_line_start = false;
            self.indent = 0;

            if c == '\\' {
                self.lex_escape()?;
                continue;
            }

            match TokenKind::structural(c) {
                Some(kind) => {
                    let pos = self.here();
                    self.flush_text();
                    self.tokens.push(Token::new(kind, c, pos));
                    if kind == TokenKind::Newline {
                        self.line += 1;
                        self.col = 0;
                        self.at_line_start = true;
                    }
                }
                None => self.push_text(c, self.here()),
            }
        }

        self.flush_text();
        self.tokens.push(Token::new(
            TokenKind::Eof,
            "",
            Pos::new(self.line, self.col + 1),
        ));
        Ok(())
    }

    /// Digits at the start of a line: a marker if `.` or `)` follows, text otherwise
    fn lex_marker(&mut self, first: char) -> Result<()> {
        let start = self.here();
        let mut digits = String::from(first);

        loop {
            match self.read()? {
                Some(next) if next.is_ascii_digit() => digits.push(next),
                Some(next) if next == '.' || next == ')' => {
                    digits.push(next);
                    self.flush_text();
                    self.tokens.push(Token::new(TokenKind::OlMarker, digits, start));
                    return Ok(());
                }
                Some(next) => {
                    self.unread(next);
                    break;
                }
                None => break,
            }
        }

        if self.text.is_empty() {
            self.text_pos = start;
        }
        self.text.push_str(&digits);
        Ok(())
    }

    /// Backslash: the next char is literal text when it is an inline special
    fn lex_escape(&mut self) -> Result<()> {
        self.push_text('\\', self.here());
        match self.read()? {
            Some(next) if is_inline_special(next) => self.push_text(next, self.here()),
            Some(next) => self.unread(next),
            None => {}
        }
        Ok(())
    }

    fn read(&mut self) -> Result<Option<char>> {
        self.cancel.check_flag()?;
        let c = self.chars.next_char()?;
        if c.is_some() {
            self.col += 1;
        }
        Ok(c)
    }

    fn unread(&mut self, c: char) {
        self.chars.unread(c);
        self.col -= 1;
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.col)
    }

    fn push_text(&mut self, c: char, pos: Pos) {
        if self.text.is_empty() {
            self.text_pos = pos;
        }
        self.text.push(c);
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        self.tokens.push(Token::new(TokenKind::Text, text, self.text_pos));
    }
}
