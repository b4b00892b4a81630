//! One-pass parser: Markdown text straight to an element tree
//!
//! Works line by line on the source without building tokens. Each line is
//! classified (blank, rule, list item, heading, plain), and inline spans are
//! found through a small index of the structural bytes of the line, so closing
//! delimiters are located without rescanning. Bytes escaped with a backslash
//! are left out of the index and stay text.

use smallvec::SmallVec;

use roundmark_core::escape::is_inline_special;
use roundmark_core::{Document, Element, Kind, ListKind};

use crate::cancel::Cancellation;
use crate::{Interrupted, Result};

/// Bytes that start or end inline syntax, matching the lexer's structural tokens
const STRUCTURAL: &[u8] = b"#*_[]()`!-";

/// Indent counted for a tab at the start of a list item
const TAB_WIDTH: usize = 2;

/// Parse `text`, polling `cancel` once per line
pub fn parse(
    text: &str,
    cancel: &Cancellation,
) -> std::result::Result<Document, Interrupted<Document>> {
    let mut parser = OnePassParser::new(cancel);

    match parser.run(text) {
        Ok(()) => {
            log::debug!(
                "Parsed {} lines into {} top-level elements",
                parser.line,
                parser.elements.len()
            );
            Ok(Document::new(parser.elements))
        }
        Err(error) => {
            log::debug!("One-pass parse stopped at line {}: {}", parser.line, error);
            Err(Interrupted::new(Document::new(parser.elements), error))
        }
    }
}

/// An open list: its index among its parent's children, and its kind
#[derive(Debug, Clone, Copy)]
struct Parent {
    index: usize,
    kind: ListKind,
}

struct OnePassParser<'c> {
    cancel: &'c Cancellation,
    elements: Vec<Element>,
    parents: Vec<Parent>,
    /// 1-based number of the line being parsed
    line: usize,
}

/// A list item line split into its parts
struct ListItem<'a> {
    kind: ListKind,
    generation: usize,
    content: &'a str,
}

impl<'c> OnePassParser<'c> {
    fn new(cancel: &'c Cancellation) -> Self {
        Self {
            cancel,
            elements: Vec::new(),
            parents: Vec::new(),
            line: 0,
        }
    }

    fn run(&mut self, text: &str) -> Result<()> {
        let last = text.bytes().filter(|&b| b == b'\n').count();

        for (number, line) in text.split('\n').enumerate() {
            self.cancel.check()?;
            self.line = number + 1;

            if line.is_empty() {
                // the segment after a final newline is not a line
                if number < last {
                    self.parents.clear();
                    self.elements.push(Element::raw_text("").ln());
                }
                continue;
            }

            if is_rule(line) {
                log::trace!("Line {}: rule", self.line);
                self.parents.clear();
                self.elements.push(Element::rule());
                continue;
            }

            if let Some(item) = list_item(line) {
                log::trace!(
                    "Line {}: {:?} item, generation {}",
                    self.line,
                    item.kind,
                    item.generation
                );
                self.reconcile(item.kind, item.generation);
                let content = scan_inline(item.content);
                self.insertion_target().extend(content);
                continue;
            }

            self.parents.clear();
            if line.starts_with('#') {
                self.elements.push(heading(line));
            } else {
                let content = scan_inline(line);
                self.elements.extend(content);
            }
        }

        Ok(())
    }

    /// Bring the parent stack to `generation` open lists with `kind` innermost
    fn reconcile(&mut self, kind: ListKind, generation: usize) {
        self.parents.truncate(generation);

        // same depth, different kind: the new item starts a sibling list
        if self.parents.len() == generation
            && self.parents.last().is_some_and(|parent| parent.kind != kind)
        {
            self.parents.pop();
        }

        while self.parents.len() < generation {
            let target = self.insertion_target();
            let index = target.len();
            target.push(Element::list(kind, Vec::new()));
            self.parents.push(Parent { index, kind });
        }
    }

    /// Children of the innermost open list, or the top level
    fn insertion_target(&mut self) -> &mut Vec<Element> {
        let mut target = &mut self.elements;
        for parent in &self.parents {
            target = &mut target[parent.index].children;
        }
        target
    }
}

/// Only dashes, spaces and tabs, with at least three dashes
fn is_rule(line: &str) -> bool {
    line.bytes().all(|b| matches!(b, b'-' | b' ' | b'\t'))
        && line.bytes().filter(|&b| b == b'-').count() >= 3
}

fn list_item(line: &str) -> Option<ListItem<'_>> {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let indent: usize = line[..line.len() - trimmed.len()]
        .bytes()
        .map(|b| if b == b'\t' { TAB_WIDTH } else { 1 })
        .sum();

    let (kind, content) = if let Some(content) = trimmed.strip_prefix("- ") {
        (ListKind::Unordered, content)
    } else {
        let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || !matches!(trimmed.as_bytes().get(digits), Some(b'.' | b')')) {
            return None;
        }
        let rest = &trimmed[digits + 1..];
        (ListKind::Ordered, rest.strip_prefix(' ').unwrap_or(rest))
    };

    Some(ListItem {
        kind,
        generation: indent / 2 + 1,
        content,
    })
}

fn heading(line: &str) -> Element {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    Element {
        level: hashes.min(6) as u8,
        line_break: true,
        ..Element::new(Kind::Heading, line[hashes..].trim_start_matches(' '))
    }
}

/// Inline scan of one line
fn scan_inline(line: &str) -> Vec<Element> {
    InlineScan::new(line).run()
}

struct InlineScan<'a> {
    line: &'a str,
    bytes: &'a [u8],
    /// Byte offsets of structural bytes, ascending
    specials: SmallVec<[usize; 16]>,
}

impl<'a> InlineScan<'a> {
    fn new(line: &'a str) -> Self {
        let bytes = line.as_bytes();
        Self {
            line,
            bytes,
            specials: structural_offsets(bytes),
        }
    }

    fn run(&self) -> Vec<Element> {
        let mut out: Vec<Element> = Vec::new();
        let mut text = String::new();
        let mut after_link = false;
        let mut i = 0;

        while i < self.bytes.len() {
            if let Some((element, end)) = self.span_at(i) {
                if !text.is_empty() {
                    out.push(Element::raw_text(std::mem::take(&mut text)));
                }
                after_link = element.kind == Kind::Link;
                out.push(element);
                i = end;
                continue;
            }

            if after_link && self.bytes[i] == b' ' {
                i += 1;
                after_link = false;
                continue;
            }
            after_link = false;

            let end = if self.is_special(i) {
                i + 1
            } else {
                self.next_special(i).unwrap_or(self.bytes.len())
            };
            text.push_str(&self.line[i..end]);
            i = end;
        }

        if !text.is_empty() {
            out.push(Element::raw_text(text));
        }
        match out.last_mut() {
            Some(last) => last.line_break = true,
            None => out.push(Element::raw_text("").ln()),
        }
        out
    }

    fn is_special(&self, at: usize) -> bool {
        self.specials.binary_search(&at).is_ok()
    }

    /// First structural byte after `at`
    fn next_special(&self, at: usize) -> Option<usize> {
        let k = self.specials.partition_point(|&p| p <= at);
        self.specials.get(k).copied()
    }

    fn is_byte(&self, at: usize, byte: u8) -> bool {
        self.bytes.get(at) == Some(&byte)
    }

    /// Offset of `close` when it is the next structural byte after `open`
    /// and a non-empty plain run lies between them
    fn closing(&self, open: usize, close: u8) -> Option<usize> {
        let k = self.next_special(open)?;
        (k > open + 1 && self.bytes[k] == close).then_some(k)
    }

    /// The span starting at `i` and the offset just past it
    fn span_at(&self, i: usize) -> Option<(Element, usize)> {
        if !self.is_special(i) {
            return None;
        }
        match self.bytes[i] {
            b'`' => {
                let k = self.closing(i, b'`')?;
                Some((Element::new(Kind::CodeSpan, &self.line[i..=k]), k + 1))
            }
            b'*' => {
                if !self.is_byte(i + 1, b'*') {
                    return None;
                }
                let k = self.closing(i + 1, b'*')?;
                if !self.is_byte(k + 1, b'*') {
                    return None;
                }
                Some((Element::new(Kind::Bold, &self.line[i..=k + 1]), k + 2))
            }
            b'_' => {
                let k = self.closing(i, b'_')?;
                Some((Element::new(Kind::Italic, &self.line[i..=k]), k + 1))
            }
            b'!' => {
                if !self.is_byte(i + 1, b'[') {
                    return None;
                }
                let (alt, href, end) = self.target(i + 1)?;
                let image = Element {
                    kind: Kind::Image,
                    alt: alt.to_string(),
                    href: href.to_string(),
                    ..Default::default()
                };
                Some((image, end))
            }
            b'[' => {
                let (text, href, end) = self.target(i)?;
                let link = Element {
                    href: href.to_string(),
                    ..Element::new(Kind::Link, text)
                };
                Some((link, end))
            }
            _ => None,
        }
    }

    /// `[text](href)` starting at the `[` at `open`
    fn target(&self, open: usize) -> Option<(&'a str, &'a str, usize)> {
        let close = self.closing(open, b']')?;
        if !self.is_byte(close + 1, b'(') {
            return None;
        }
        let end = self.closing(close + 1, b')')?;
        Some((
            &self.line[open + 1..close],
            &self.line[close + 2..end],
            end + 1,
        ))
    }
}

/// Offsets of unescaped structural bytes, ascending
fn structural_offsets(bytes: &[u8]) -> SmallVec<[usize; 16]> {
    let mut offsets = SmallVec::new();
    let mut i = 0;

    while i < bytes.len() {
        let escaped = bytes[i] == b'\\'
            && bytes
                .get(i + 1)
                .is_some_and(|&next| is_inline_special(char::from(next)));
        if escaped {
            i += 2;
            continue;
        }
        if STRUCTURAL.contains(&bytes[i]) {
            offsets.push(i);
        }
        i += 1;
    }

    offsets
}
