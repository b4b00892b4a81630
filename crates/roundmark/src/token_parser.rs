//! Token parser: lexer tokens to an element tree
//!
//! Block structure is decided at the start of each line (rule, heading, list
//! item, plain line), then the rest of the line is matched against fixed token
//! patterns for inline spans. Anything that does not match stays literal text.

use roundmark_core::{Document, Element, Kind, ListKind};

use crate::cancel::Cancellation;
use crate::token::{source_text, Token, TokenKind};
use crate::{Interrupted, Result};

/// Indent counted for a tab when no lexer options say otherwise
pub const DEFAULT_TAB_WIDTH: usize = 2;

const CODE_SPAN: &[TokenKind] = &[TokenKind::Backtick, TokenKind::Text, TokenKind::Backtick];

const BOLD: &[TokenKind] = &[
    TokenKind::Star,
    TokenKind::Star,
    TokenKind::Text,
    TokenKind::Star,
    TokenKind::Star,
];

const ITALIC: &[TokenKind] = &[TokenKind::Underscore, TokenKind::Text, TokenKind::Underscore];

const IMAGE: &[TokenKind] = &[
    TokenKind::Bang,
    TokenKind::LBracket,
    TokenKind::Text,
    TokenKind::RBracket,
    TokenKind::LParen,
    TokenKind::Text,
    TokenKind::RParen,
];

const LINK: &[TokenKind] = &[
    TokenKind::LBracket,
    TokenKind::Text,
    TokenKind::RBracket,
    TokenKind::LParen,
    TokenKind::Text,
    TokenKind::RParen,
];

/// Parse `tokens` into a document, polling `cancel` at every token
pub fn parse(
    tokens: &[Token],
    cancel: &Cancellation,
) -> std::result::Result<Document, Interrupted<Document>> {
    parse_with_tab_width(tokens, DEFAULT_TAB_WIDTH, cancel)
}

/// Parse `tokens`, counting a tab in list indentation as `tab_width` columns.
///
/// Use the lexer's `tab_width` so marker detection and list nesting agree.
pub fn parse_with_tab_width(
    tokens: &[Token],
    tab_width: usize,
    cancel: &Cancellation,
) -> std::result::Result<Document, Interrupted<Document>> {
    let mut parser = TokenParser::new(tokens, tab_width, cancel);

    match parser.run() {
        Ok(()) => {
            log::debug!(
                "Parsed {} tokens into {} top-level elements",
                tokens.len(),
                parser.out.len()
            );
            Ok(Document::new(parser.out))
        }
        Err(error) => {
            log::debug!("Token parse stopped at token {}: {}", parser.cursor, error);
            Err(Interrupted::new(Document::new(parser.out), error))
        }
    }
}

struct TokenParser<'t, 'c> {
    tokens: &'t [Token],
    cancel: &'c Cancellation,
    tab_width: usize,
    cursor: usize,
    bol: bool,
    out: Vec<Element>,
    /// Open lists, outermost first. Each entry is the child index of the list
    /// inside its parent (or inside `out` for the first) and its kind.
    lists: Vec<(usize, ListKind)>,
}

impl<'t, 'c> TokenParser<'t, 'c> {
    fn new(tokens: &'t [Token], tab_width: usize, cancel: &'c Cancellation) -> Self {
        Self {
            tokens,
            cancel,
            tab_width,
            cursor: 0,
            bol: true,
            out: Vec::new(),
            lists: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<()> {
        while let Some(token) = self.token(self.cursor) {
            self.cancel.check()?;

            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    if self.bol {
                        self.lists.clear();
                        self.out.push(Element::raw_text("").ln());
                    }
                    self.bol = true;
                    self.cursor += 1;
                    continue;
                }
                _ => {}
            }

            if !self.bol {
                let line = self.inline_line(false)?;
                self.out.extend(line);
                self.bol = true;
                continue;
            }

            if let Some(next) = self.rule_end() {
                log::trace!("Rule at {}", token.pos);
                self.lists.clear();
                self.out.push(Element::rule());
                self.cursor = next;
                continue;
            }

            if token.is(TokenKind::Hash) {
                self.heading()?;
                continue;
            }

            if let Some((kind, generation, content)) = self.list_marker() {
                log::trace!("{:?} item at {}, generation {}", kind, token.pos, generation);
                self.open_item(kind, generation);
                self.cursor = content;
                let items = self.inline_line(true)?;
                let depth = self.lists.len();
                self.container(depth).extend(items);
                self.bol = true;
                continue;
            }

            self.lists.clear();
            let line = self.inline_line(false)?;
            self.out.extend(line);
            self.bol = true;
        }

        Ok(())
    }

    fn token(&self, at: usize) -> Option<&'t Token> {
        self.tokens.get(at)
    }

    fn kind(&self, at: usize) -> TokenKind {
        self.token(at).map_or(TokenKind::Eof, |token| token.kind)
    }

    /// Index after a rule line, which holds at least three dashes and only blank text
    fn rule_end(&self) -> Option<usize> {
        let mut at = self.cursor;
        let mut dashes = 0;

        loop {
            match self.token(at) {
                Some(token) if token.is(TokenKind::Dash) => dashes += 1,
                Some(token) if token.is_blank_text() => {}
                Some(token) if token.is(TokenKind::Newline) => {
                    at += 1;
                    break;
                }
                Some(token) if token.is(TokenKind::Eof) => break,
                None => break,
                Some(_) => return None,
            }
            at += 1;
        }

        (dashes >= 3).then_some(at)
    }

    fn heading(&mut self) -> Result<()> {
        let mut level = 0usize;
        while self.kind(self.cursor) == TokenKind::Hash {
            self.cancel.check()?;
            level += 1;
            self.cursor += 1;
        }

        let start = self.cursor;
        while !matches!(self.kind(self.cursor), TokenKind::Newline | TokenKind::Eof) {
            self.cancel.check()?;
            self.cursor += 1;
        }
        let text = source_text(&self.tokens[start..self.cursor]);

        self.lists.clear();
        self.out.push(Element {
            level: level.min(6) as u8,
            line_break: true,
            ..Element::new(Kind::Heading, text.trim_start_matches(' '))
        });
        // the newline ending a heading is not a blank line
        self.bol = false;
        Ok(())
    }

    /// Kind, generation and content index of a list item starting at the cursor
    fn list_marker(&self) -> Option<(ListKind, usize, usize)> {
        let (indent, at) = match self.token(self.cursor) {
            Some(token) if token.is_blank_text() => {
                (indent_width(&token.lexeme, self.tab_width), self.cursor + 1)
            }
            _ => (0, self.cursor),
        };

        let kind = match self.kind(at) {
            TokenKind::OlMarker => ListKind::Ordered,
            TokenKind::Dash
                if self
                    .token(at + 1)
                    .is_some_and(|t| t.is(TokenKind::Text) && t.lexeme.starts_with(' ')) =>
            {
                ListKind::Unordered
            }
            _ => return None,
        };

        Some((kind, indent / 2 + 1, at + 1))
    }

    /// Reconcile the open lists with an item of `kind` at `generation`
    fn open_item(&mut self, kind: ListKind, generation: usize) {
        let depth = self.lists.len();

        if generation > depth {
            let missing = generation - depth;
            let mut node = Element::list(kind, Vec::new());
            for _ in 1..missing {
                node = Element::list(kind, vec![node]);
            }

            let parent = self.container(depth);
            let index = parent.len();
            parent.push(node);

            self.lists.push((index, kind));
            for _ in 1..missing {
                self.lists.push((0, kind));
            }
            return;
        }

        self.lists.truncate(generation);
        if self.lists.last().is_some_and(|&(_, open)| open != kind) {
            let parent = self.container(generation - 1);
            let index = parent.len();
            parent.push(Element::list(kind, Vec::new()));
            self.lists[generation - 1] = (index, kind);
        }
    }

    /// Children of the list open at `depth`, or the top level for depth 0
    fn container(&mut self, depth: usize) -> &mut Vec<Element> {
        let mut elements = &mut self.out;
        for &(index, _) in &self.lists[..depth] {
            elements = &mut elements[index].children;
        }
        elements
    }

    /// Try to match `pattern` at the cursor
    fn pattern(&self, pattern: &[TokenKind]) -> Option<&'t [Token]> {
        let window = self.tokens.get(self.cursor..self.cursor + pattern.len())?;
        window
            .iter()
            .zip(pattern)
            .all(|(token, kind)| token.kind == *kind)
            .then_some(window)
    }

    /// Inline span starting at the cursor and the number of tokens it covers
    fn inline_span(&self, token: &Token) -> Option<(Element, usize)> {
        let span = match token.kind {
            TokenKind::Backtick => (
                Element::new(Kind::CodeSpan, source_text(self.pattern(CODE_SPAN)?)),
                CODE_SPAN.len(),
            ),
            TokenKind::Star => (
                Element::new(Kind::Bold, source_text(self.pattern(BOLD)?)),
                BOLD.len(),
            ),
            TokenKind::Underscore => (
                Element::new(Kind::Italic, source_text(self.pattern(ITALIC)?)),
                ITALIC.len(),
            ),
            TokenKind::Bang => {
                let window = self.pattern(IMAGE)?;
                let image = Element {
                    kind: Kind::Image,
                    alt: window[2].lexeme.clone(),
                    href: window[5].lexeme.clone(),
                    ..Default::default()
                };
                (image, IMAGE.len())
            }
            TokenKind::LBracket => {
                let window = self.pattern(LINK)?;
                let link = Element {
                    href: window[4].lexeme.clone(),
                    ..Element::new(Kind::Link, window[1].lexeme.as_str())
                };
                (link, LINK.len())
            }
            _ => return None,
        };
        Some(span)
    }

    /// Parse the rest of the line and consume its newline
    fn inline_line(&mut self, trim_first: bool) -> Result<Vec<Element>> {
        let mut line: Vec<Element> = Vec::new();
        let mut text = String::new();
        let mut first = true;
        let mut after_link = false;

        while let Some(token) = self.token(self.cursor) {
            self.cancel.check()?;
            if matches!(token.kind, TokenKind::Newline | TokenKind::Eof) {
                break;
            }

            if let Some((element, len)) = self.inline_span(token) {
                if !text.is_empty() {
                    line.push(Element::raw_text(std::mem::take(&mut text)));
                }
                after_link = element.kind == Kind::Link;
                line.push(element);
                self.cursor += len;
            } else {
                let mut lexeme = token.lexeme.as_str();
                // one space after a list marker or a link belongs to the syntax
                if token.is(TokenKind::Text) && ((first && trim_first) || after_link) {
                    lexeme = lexeme.strip_prefix(' ').unwrap_or(lexeme);
                }
                text.push_str(lexeme);
                after_link = false;
                self.cursor += 1;
            }
            first = false;
        }

        if self.kind(self.cursor) == TokenKind::Newline {
            self.cursor += 1;
        }
        if !text.is_empty() {
            line.push(Element::raw_text(text));
        }

        match line.last_mut() {
            Some(last) => last.line_break = true,
            None => line.push(Element::raw_text("").ln()),
        }
        Ok(line)
    }
}

fn indent_width(whitespace: &str, tab_width: usize) -> usize {
    whitespace
        .chars()
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexer, LexerOptions};
    use crate::tokenize;
    use roundmark_core::render;

    fn parse_str(input: &str) -> Vec<Element> {
        parse(&tokenize(input), &Cancellation::never())
            .unwrap()
            .elements
    }

    #[test]
    fn test_heading() {
        let elements = parse_str("# Hello\n");
        assert_eq!(
            elements,
            vec![Element {
                level: 1,
                line_break: true,
                ..Element::new(Kind::Heading, "Hello")
            }]
        );
        assert_eq!(render(&elements), "# Hello\n");
    }

    #[test]
    fn test_heading_level_is_capped() {
        let elements = parse_str("######### deep\n");
        assert_eq!(elements[0].level, 6);
        assert_eq!(elements[0].text, "deep");
    }

    #[test]
    fn test_newline_after_heading_is_not_blank() {
        let elements = parse_str("# a\nb\n");
        assert_eq!(elements.len(), 2);
        let elements = parse_str("# a\n\nb\n");
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1], Element::raw_text("").ln());
    }

    #[test]
    fn test_unordered_list() {
        let elements = parse_str("- one\n- two\n");
        assert_eq!(
            elements,
            vec![Element::ul(vec![Element::textln("one"), Element::textln("two")])]
        );
        assert_eq!(render(&elements), "- one\n- two\n");
    }

    #[test]
    fn test_ordered_markers_are_normalized() {
        let elements = parse_str("1) one\n2. two\n");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].list_kind, ListKind::Ordered);
        assert_eq!(elements[0].children.len(), 2);
        assert_eq!(render(&elements), "1. one\n2. two\n");
    }

    #[test]
    fn test_inline_spans() {
        let elements = parse_str("**b** _i_ `c` [x](y) ![alt](img)\n");
        assert_eq!(
            elements,
            vec![
                Element::new(Kind::Bold, "**b**"),
                Element::raw_text(" "),
                Element::new(Kind::Italic, "_i_"),
                Element::raw_text(" "),
                Element::new(Kind::CodeSpan, "`c`"),
                Element::raw_text(" "),
                Element {
                    href: "y".to_string(),
                    ..Element::new(Kind::Link, "x")
                },
                Element {
                    kind: Kind::Image,
                    alt: "alt".to_string(),
                    href: "img".to_string(),
                    line_break: true,
                    ..Default::default()
                },
            ]
        );
        assert_eq!(render(&elements), "**b** _i_ `c` [x](y) ![alt](img)\n");
    }

    #[test]
    fn test_unmatched_delimiters_are_text() {
        let elements = parse_str("a * b _c [d] (e) ` !\n");
        assert_eq!(elements, vec![Element::raw_text("a * b _c [d] (e) ` !").ln()]);
    }

    #[test]
    fn test_rule_closes_list() {
        let elements = parse_str("- a\n---\n- b\n");
        assert_eq!(elements.len(), 3);
        assert!(elements[0].is_list());
        assert_eq!(elements[1], Element::rule());
        assert!(elements[2].is_list());
        assert_eq!(parse_str("- - -\n"), vec![Element::rule()]);
    }

    #[test]
    fn test_blank_line_closes_list() {
        let elements = parse_str("- a\n\n- b\n");
        assert_eq!(elements.len(), 3);
        assert_eq!(render(&elements), "- a\n\n- b\n");
    }

    #[test]
    fn test_nested_lists() {
        let input = "- a\n  - b\n    - c\n  - d\n- e\n";
        let elements = parse_str(input);
        assert_eq!(
            elements,
            vec![Element::ul(vec![
                Element::textln("a"),
                Element::ul(vec![
                    Element::textln("b"),
                    Element::ul(vec![Element::textln("c")]),
                    Element::textln("d"),
                ]),
                Element::textln("e"),
            ])]
        );
        assert_eq!(render(&elements), input);
    }

    #[test]
    fn test_kind_change_opens_sibling_list() {
        let elements = parse_str("- a\n1. b\n");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].list_kind, ListKind::Unordered);
        assert_eq!(elements[1].list_kind, ListKind::Ordered);
    }

    #[test]
    fn test_link_swallows_one_space() {
        let elements = parse_str("[a](b)  c\n");
        assert_eq!(elements[1], Element::raw_text(" c").ln());
        assert_eq!(render(&parse_str("[a](b) c\n")), "[a](b) c\n");
    }

    #[test]
    fn test_escaped_delimiters_stay_text() {
        let source = render(&[Element::textln("call _init_ with `ls` and [a](b)")]);
        assert_eq!(source, "call \\_init\\_ with \\`ls\\` and \\[a\\]\\(b\\)\n");

        let elements = parse_str(&source);
        assert_eq!(elements, vec![Element::textln("call _init_ with `ls` and [a](b)")]);
        assert_eq!(elements[0].plain_text(), "call _init_ with `ls` and [a](b)");
    }

    #[test]
    fn test_escapes_inside_spans() {
        let built = vec![
            Element::bold("2*3"),
            Element::text(" "),
            Element::italic("snake_case"),
            Element::text(" "),
            Element::code("a`b"),
            Element::text(" "),
            Element::linkln("see [1]", "x"),
        ];
        assert_eq!(parse_str(&render(&built)), built);
    }

    #[test]
    fn test_tab_width_sets_generation() {
        let tokens = Lexer::with_options(LexerOptions {
            tab_width: 4,
            ..Default::default()
        })
        .tokenize("- a\n\t- b\n".as_bytes(), &Cancellation::never())
        .unwrap();

        let wide = parse_with_tab_width(&tokens, 4, &Cancellation::never())
            .unwrap()
            .elements;
        assert_eq!(wide[0].children[1].children[0].children, vec![Element::textln("b")]);

        let narrow = parse(&tokens, &Cancellation::never()).unwrap().elements;
        assert_eq!(narrow[0].children[1].children, vec![Element::textln("b")]);
    }

    #[test]
    fn test_empty_item() {
        let elements = parse_str("- \n");
        assert_eq!(elements, vec![Element::ul(vec![Element::raw_text("").ln()])]);
    }

    #[test]
    fn test_canceled() {
        let tokens = tokenize("# a\nb\n");
        let cancel = Cancellation::new();
        cancel.cancel();
        let err = parse(&tokens, &cancel).unwrap_err();
        assert!(matches!(err.error, crate::Error::Canceled));
        assert!(err.partial.is_empty());
    }
}
