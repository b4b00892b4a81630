//! roundmark-core - document model and canonical Markdown rendering
//!
//! This crate provides the element tree and the renderer for roundmark. It is
//! used by both parsers in the `roundmark` crate (the token pipeline and the
//! one-pass scanner), which build the same trees from Markdown text.
//!
//! # Architecture
//!
//! ```text
//! Markdown ──lexer──▶ tokens ──token parser──┐
//!                                            ▼
//!                                    ┌──────────────┐
//!                                    │ Element tree │ ──render──▶ Markdown
//!                                    └──────────────┘
//!                                            ▲
//! Markdown ──────────one-pass parser─────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use roundmark_core::{render, Element};
//!
//! let elements = vec![
//!     Element::h1("Hello World"),
//!     Element::text("This is "),
//!     Element::bold("bold"),
//!     Element::textln(" text."),
//!     Element::ul(vec![Element::textln("one"), Element::textln("two")]),
//! ];
//!
//! let markdown = render(&elements);
//! assert_eq!(markdown, "# Hello World\nThis is **bold** text.\n- one\n- two\n");
//! ```

mod element;
pub mod escape;
mod options;
mod render;

pub use element::{walk, Document, Element, Kind, ListKind};
pub use options::RenderOptions;
pub use render::{render, render_with_options};
