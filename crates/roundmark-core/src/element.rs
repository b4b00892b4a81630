//! Document model
//!
//! This module defines the element tree shared by both parsers and the renderer.
//! Elements store their Markdown source form: a bold element holds `**text**`,
//! a link holds its escaped display text and URL. Constructors escape user input,
//! parsers keep what they read, so both render the same way.

use crate::escape::{escape_backticks, escape_inline, escape_url, unescape_inline, unescape_url};

/// The variant tag of an [`Element`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    /// ATX heading, `level` 1-6
    Heading,
    /// Plain text run
    #[default]
    Text,
    /// Strong emphasis, `text` carries the `**` delimiters
    Bold,
    /// Emphasis, `text` carries the `_` delimiters
    Italic,
    /// Inline code, `text` carries the backticks
    CodeSpan,
    /// Fenced code block with optional `lang`
    CodeBlock,
    /// Empty line
    NewLine,
    /// Horizontal rule
    Rule,
    /// Inline link, `text` is the display text and `href` the target
    Link,
    /// Image, `alt` and `href`
    Image,
    /// List container, items live in `children`
    List,
    /// Block quote container
    Quote,
}

/// List flavour, only meaningful on [`Kind::List`] nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListKind {
    #[default]
    None,
    Unordered,
    Ordered,
}

/// A single node of the document tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub kind: Kind,
    pub text: String,
    /// This node ends its own line
    pub line_break: bool,
    pub level: u8,
    pub href: String,
    pub alt: String,
    pub list_kind: ListKind,
    pub lang: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element of `kind` holding `text` verbatim
    pub fn new(kind: Kind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Mark this element as ending its line
    pub fn ln(mut self) -> Self {
        self.line_break = true;
        self
    }

    /// Heading with the level clamped to 1..=6
    pub fn heading(level: u8, text: &str) -> Self {
        Self {
            level: level.clamp(1, 6),
            line_break: true,
            ..Self::new(Kind::Heading, escape_inline(text))
        }
    }

    pub fn h1(text: &str) -> Self {
        Self::heading(1, text)
    }

    pub fn h2(text: &str) -> Self {
        Self::heading(2, text)
    }

    pub fn h3(text: &str) -> Self {
        Self::heading(3, text)
    }

    pub fn h4(text: &str) -> Self {
        Self::heading(4, text)
    }

    pub fn h5(text: &str) -> Self {
        Self::heading(5, text)
    }

    pub fn h6(text: &str) -> Self {
        Self::heading(6, text)
    }

    /// Text run with inline specials escaped
    pub fn text(text: &str) -> Self {
        Self::new(Kind::Text, escape_inline(text))
    }

    pub fn textln(text: &str) -> Self {
        Self::text(text).ln()
    }

    /// Text run stored as given, for content that is already Markdown
    pub fn raw_text(text: impl Into<String>) -> Self {
        Self::new(Kind::Text, text)
    }

    pub fn bold(text: &str) -> Self {
        Self::new(Kind::Bold, wrap("**", &escape_inline(text)))
    }

    pub fn boldln(text: &str) -> Self {
        Self::bold(text).ln()
    }

    pub fn italic(text: &str) -> Self {
        Self::new(Kind::Italic, wrap("_", &escape_inline(text)))
    }

    pub fn italicln(text: &str) -> Self {
        Self::italic(text).ln()
    }

    /// Inline code span
    pub fn code(code: &str) -> Self {
        Self::new(Kind::CodeSpan, wrap("`", &escape_backticks(code)))
    }

    pub fn codeln(code: &str) -> Self {
        Self::code(code).ln()
    }

    /// Fenced code block; the body is kept verbatim
    pub fn code_block(lang: &str, code: &str) -> Self {
        Self {
            lang: lang.to_string(),
            line_break: true,
            ..Self::new(Kind::CodeBlock, code)
        }
    }

    pub fn link(text: &str, href: &str) -> Self {
        Self {
            href: escape_url(href),
            ..Self::new(Kind::Link, escape_inline(text))
        }
    }

    pub fn linkln(text: &str, href: &str) -> Self {
        Self::link(text, href).ln()
    }

    /// Images always end their line
    pub fn image(alt: &str, href: &str) -> Self {
        Self {
            kind: Kind::Image,
            alt: escape_inline(alt),
            href: escape_url(href),
            line_break: true,
            ..Default::default()
        }
    }

    pub fn rule() -> Self {
        Self::new(Kind::Rule, "").ln()
    }

    /// Empty line
    pub fn nl() -> Self {
        Self::new(Kind::NewLine, "").ln()
    }

    pub fn list(list_kind: ListKind, children: Vec<Element>) -> Self {
        Self {
            kind: Kind::List,
            list_kind,
            children,
            ..Default::default()
        }
    }

    pub fn ul(children: Vec<Element>) -> Self {
        Self::list(ListKind::Unordered, children)
    }

    pub fn ol(children: Vec<Element>) -> Self {
        Self::list(ListKind::Ordered, children)
    }

    pub fn quote(children: Vec<Element>) -> Self {
        Self {
            kind: Kind::Quote,
            children,
            ..Default::default()
        }
    }

    pub fn is_list(&self) -> bool {
        self.kind == Kind::List
    }

    /// Lists and quotes hold their content in `children`
    pub fn is_container(&self) -> bool {
        matches!(self.kind, Kind::List | Kind::Quote)
    }

    /// Text content with delimiters stripped and escapes removed
    pub fn plain_text(&self) -> String {
        match self.kind {
            Kind::Bold => unescape_inline(strip_wrap(&self.text, "**")),
            Kind::Italic => unescape_inline(strip_wrap(&self.text, "_")),
            Kind::CodeSpan => strip_wrap(&self.text, "`").replace("\\`", "`"),
            Kind::Image => unescape_inline(&self.alt),
            Kind::CodeBlock | Kind::Rule | Kind::NewLine => self.text.clone(),
            _ => unescape_inline(&self.text),
        }
    }

    /// The link or image target with URL escapes removed
    pub fn decoded_href(&self) -> String {
        unescape_url(&self.href)
    }

    /// Pre-order traversal of this element and its descendants
    pub fn walk<F: FnMut(&Element)>(&self, visit: &mut F) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Pre-order traversal over a sequence of elements
pub fn walk<F: FnMut(&Element)>(elements: &[Element], mut visit: F) {
    for element in elements {
        element.walk(&mut visit);
    }
}

/// An ordered sequence of top-level elements produced by one parse
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub name: Option<String>,
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            name: None,
            elements,
        }
    }

    pub fn named(name: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            name: Some(name.into()),
            elements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements in the tree, nested ones included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        walk(&self.elements, |_| count += 1);
        count
    }

    /// Render to canonical Markdown
    pub fn render(&self) -> String {
        crate::render::render(&self.elements)
    }
}

fn wrap(delimiter: &str, s: &str) -> String {
    let mut out = String::with_capacity(s.len() + delimiter.len() * 2);
    out.push_str(delimiter);
    out.push_str(s);
    out.push_str(delimiter);
    out
}

fn strip_wrap<'a>(s: &'a str, delimiter: &str) -> &'a str {
    s.strip_prefix(delimiter)
        .and_then(|inner| inner.strip_suffix(delimiter))
        .unwrap_or(s)
}
