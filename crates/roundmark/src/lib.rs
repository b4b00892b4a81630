//! # roundmark
//!
//! Round-trip Markdown: parse a small Markdown subset into an element tree and
//! render the tree back to canonical Markdown.
//!
//! ## Design
//!
//! Two independent parsers build the same [`Document`]:
//!
//! - **One-pass** ([`parse`]): scans the text line by line with no token stream.
//!   Lowest allocation, the default choice.
//! - **Pipeline** ([`tokenize`] then [`parse_tokens`]): keeps positioned tokens
//!   around for tooling.
//!
//! For canonical input both render to the same bytes, and that output parses
//! back to an equivalent tree. Every call owns its state, so calls on separate
//! threads never interfere. Long inputs can be stopped through a
//! [`Cancellation`]; interrupted calls return what they built so far inside
//! [`Interrupted`].
//!
//! ## Example
//!
//! ```rust
//! use roundmark::{parse, parse_tokens, render, tokenize};
//!
//! let source = "# Hello\n\n- one\n- **two**\n";
//!
//! let one_pass = parse(source);
//! let pipeline = parse_tokens(&tokenize(source));
//!
//! assert_eq!(render(&one_pass.elements), source);
//! assert_eq!(render(&pipeline.elements), source);
//! ```

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

pub mod cancel;
pub mod engine;
pub mod fs;
pub mod lexer;
pub mod one_pass;
pub mod token;
pub mod token_parser;

pub use cancel::Cancellation;
pub use engine::{Engine, Engines, OnePass, Pipeline};
pub use lexer::{Lexer, LexerOptions};
pub use roundmark_core::escape;
pub use roundmark_core::{
    render, render_with_options, walk, Document, Element, Kind, ListKind, RenderOptions,
};
pub use token::{Pos, Token, TokenKind};

/// Error type for roundmark operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("operation canceled")]
    Canceled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("file {} does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("error loading file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing file {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown engine: {0}")]
    UnknownEngine(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A call that stopped early, with the partial result it had built.
///
/// The partial result is best effort and must not be treated as a complete
/// parse.
#[derive(Debug)]
pub struct Interrupted<T> {
    pub partial: T,
    pub error: Error,
}

impl<T> Interrupted<T> {
    pub fn new(partial: T, error: Error) -> Self {
        Self { partial, error }
    }

    pub fn into_parts(self) -> (T, Error) {
        (self.partial, self.error)
    }
}

impl<T> fmt::Display for Interrupted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interrupted: {}", self.error)
    }
}

impl<T: fmt::Debug> std::error::Error for Interrupted<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<Interrupted<T>> for Error {
    fn from(interrupted: Interrupted<T>) -> Self {
        interrupted.error
    }
}

/// Tokenize `text`
pub fn tokenize(text: &str) -> Vec<Token> {
    // never-canceled input from memory cannot fail
    tokenize_with_cancellation(text, &Cancellation::never())
        .unwrap_or_else(|interrupted| interrupted.partial)
}

pub fn tokenize_with_cancellation(
    text: &str,
    cancel: &Cancellation,
) -> std::result::Result<Vec<Token>, Interrupted<Vec<Token>>> {
    Lexer::new().tokenize(text.as_bytes(), cancel)
}

/// Tokenize everything `reader` yields
pub fn tokenize_reader<R: Read>(
    reader: R,
    cancel: &Cancellation,
) -> std::result::Result<Vec<Token>, Interrupted<Vec<Token>>> {
    Lexer::new().tokenize(reader, cancel)
}

/// Parse lexer tokens into a document
pub fn parse_tokens(tokens: &[Token]) -> Document {
    parse_tokens_with_cancellation(tokens, &Cancellation::never())
        .unwrap_or_else(|interrupted| interrupted.partial)
}

pub fn parse_tokens_with_cancellation(
    tokens: &[Token],
    cancel: &Cancellation,
) -> std::result::Result<Document, Interrupted<Document>> {
    token_parser::parse(tokens, cancel)
}

/// Parse Markdown text with the one-pass parser
pub fn parse(text: &str) -> Document {
    parse_with_cancellation(text, &Cancellation::never())
        .unwrap_or_else(|interrupted| interrupted.partial)
}

pub fn parse_with_cancellation(
    text: &str,
    cancel: &Cancellation,
) -> std::result::Result<Document, Interrupted<Document>> {
    one_pass::parse(text, cancel)
}
