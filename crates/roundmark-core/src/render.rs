//! Element tree rendering
//!
//! Walks an element tree and writes canonical Markdown. Content is collected in a
//! line buffer and only committed when a node ends its line, because the list
//! prefix for a line is known only once the line is complete.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::element::{Element, Kind, ListKind};
use crate::options::RenderOptions;

static TRAILING_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("trailing whitespace pattern is valid"));

/// Render elements to canonical Markdown
pub fn render(elements: &[Element]) -> String {
    render_with_options(elements, &RenderOptions::default())
}

/// Render elements to Markdown with custom options
pub fn render_with_options(elements: &[Element], options: &RenderOptions) -> String {
    let mut renderer = Renderer::new(options);
    renderer.render_elements(elements);
    clean_render(&renderer.out, options.max_newlines)
}

/// One open list during rendering
#[derive(Debug, Clone, Copy)]
struct ListFrame {
    kind: ListKind,
    index: usize,
}

struct Renderer<'o> {
    options: &'o RenderOptions,
    frames: Vec<ListFrame>,
    line: String,
    out: String,
}

impl<'o> Renderer<'o> {
    fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            frames: Vec::new(),
            line: String::new(),
            out: String::with_capacity(4096),
        }
    }

    /// Render siblings; the last one ends its line unless it is a container
    fn render_elements(&mut self, elements: &[Element]) {
        let last = elements.len().saturating_sub(1);
        for (i, element) in elements.iter().enumerate() {
            let force_break = i == last && !element.line_break && !element.is_container();
            self.render_element(element, force_break);
        }
    }

    fn render_element(&mut self, element: &Element, force_break: bool) {
        let line_break = element.line_break || force_break;

        match element.kind {
            Kind::Heading => {
                for _ in 0..element.level.clamp(1, 6) {
                    self.line.push('#');
                }
                self.line.push(' ');
                self.line.push_str(&element.text);
            }
            Kind::List => self.frames.push(ListFrame {
                kind: element.list_kind,
                index: 0,
            }),
            Kind::CodeBlock => {
                self.line.push_str("```");
                self.line.push_str(&element.lang);
                self.line.push('\n');
                self.line.push_str(&element.text);
                self.line.push_str("\n```\n");
            }
            Kind::Quote => self.line.push_str("> "),
            Kind::Link => {
                self.line.push('[');
                self.line.push_str(&element.text);
                self.line.push_str("](");
                self.line.push_str(&element.href);
                self.line.push(')');
                if !line_break {
                    self.line.push(' ');
                }
            }
            Kind::Image => {
                self.line.push_str("![");
                self.line.push_str(&element.alt);
                self.line.push_str("](");
                self.line.push_str(&element.href);
                self.line.push(')');
            }
            Kind::Rule => self.line.push_str("\n---\n"),
            Kind::Text | Kind::Bold | Kind::Italic | Kind::CodeSpan | Kind::NewLine => {
                self.line.push_str(&element.text)
            }
        }

        if line_break {
            self.flush_line();
        }

        self.render_elements(&element.children);

        if element.is_list() {
            self.frames.pop();
        }
    }

    /// Commit the line buffer, prefixed by the current list marker.
    ///
    /// An empty line gets no marker. A whitespace-only item keeps its marker
    /// but loses the whitespace to cleanup, so it renders as a bare marker
    /// that parses back as an empty item.
    fn flush_line(&mut self) {
        if !self.line.is_empty() {
            let prefix = self.list_prefix();
            self.out.push_str(&prefix);
            self.out.push_str(&self.line);
        }
        self.out.push('\n');
        self.line.clear();
    }

    fn list_prefix(&mut self) -> String {
        let Some(depth) = self.frames.len().checked_sub(1) else {
            return String::new();
        };
        let mut prefix = String::new();

        if depth > 0 {
            // An unordered list opening under a top-level ordered list starts a new block
            let current = self.frames[depth];
            if depth == 1
                && self.frames[0].kind == ListKind::Ordered
                && current.kind == ListKind::Unordered
                && current.index == 0
            {
                prefix.push('\n');
            }

            let unordered_parents = self.frames[..depth]
                .iter()
                .filter(|frame| frame.kind == ListKind::Unordered)
                .count();
            for _ in 0..unordered_parents {
                prefix.push_str(&self.options.indent);
            }

            // Nested ordered lists continue their parent's numbering
            let parent = self.frames[depth - 1];
            if parent.kind == ListKind::Ordered
                && current.kind == ListKind::Ordered
                && current.index == 0
            {
                self.frames[depth].index = parent.index;
            }
        }

        let frame = &mut self.frames[depth];
        match frame.kind {
            ListKind::Unordered => {
                frame.index += 1;
                prefix.push(self.options.bullet_marker);
                prefix.push(' ');
                prefix
            }
            ListKind::Ordered => {
                frame.index += 1;
                prefix.push_str(&frame.index.to_string());
                prefix.push_str(". ");
                prefix
            }
            ListKind::None => String::new(),
        }
    }
}

/// Normalize line endings and blank lines after the tree walk
fn clean_render(s: &str, max_newlines: usize) -> String {
    let normalized = s.replace("\r\n", "\n");
    let stripped = TRAILING_WHITESPACE.replace_all(&normalized, "");
    let body = stripped.trim_start_matches('\n');

    let mut result = collapse_newlines(body, max_newlines.max(1));
    let trimmed_len = result.trim_end_matches('\n').len();
    result.truncate(trimmed_len);
    result.push('\n');
    result
}

/// Collapse runs of newlines longer than `max`
fn collapse_newlines(s: &str, max: usize) -> String {
    let mut result = String::with_capacity(s.len());
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= max {
                result.push(c);
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    result
}
