//! Property tests over generated input

use proptest::prelude::*;
use roundmark::{parse, parse_tokens, render, token::source_text, tokenize, walk, Element, Kind};

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn inline() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => word(),
        1 => word().prop_map(|w| format!("**{w}**")),
        1 => word().prop_map(|w| format!("_{w}_")),
        1 => word().prop_map(|w| format!("`{w}`")),
        1 => (word(), word()).prop_map(|(text, href)| format!("[{text}]({href})")),
        1 => (word(), word()).prop_map(|(alt, href)| format!("![{alt}]({href})")),
    ]
}

fn line() -> impl Strategy<Value = String> {
    prop::collection::vec(inline(), 1..6).prop_map(|pieces| pieces.join(" "))
}

fn unordered() -> impl Strategy<Value = String> {
    prop::collection::vec((0usize..3, line()), 1..6).prop_map(|items| {
        let mut depth = 0;
        items
            .into_iter()
            .enumerate()
            .map(|(i, (wanted, text))| {
                depth = if i == 0 { 0 } else { wanted.min(depth + 1) };
                format!("{}- {}", "  ".repeat(depth), text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn ordered() -> impl Strategy<Value = String> {
    prop::collection::vec(line(), 1..5).prop_map(|items| {
        items
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{}. {}", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn block() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => (1usize..=6, line()).prop_map(|(level, text)| format!("{} {}", "#".repeat(level), text)),
        3 => line(),
        1 => Just("---".to_string()),
        2 => unordered(),
        2 => ordered(),
    ]
}

/// Canonical documents: blocks separated by one blank line
fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(block(), 1..8).prop_map(|blocks| blocks.join("\n\n") + "\n")
}

/// Inline content handed to the constructors
#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link(String, String),
}

/// Words full of the chars constructors escape
fn user_text() -> impl Strategy<Value = String> {
    "[a-z*_`~()\\[\\]]{1,6}( [a-z*_`~()\\[\\]]{1,6}){0,2}"
}

fn piece() -> impl Strategy<Value = Piece> {
    prop_oneof![
        3 => user_text().prop_map(Piece::Text),
        1 => user_text().prop_map(Piece::Bold),
        1 => user_text().prop_map(Piece::Italic),
        1 => "[a-z`]{1,6}( [a-z`]{1,6})?".prop_map(Piece::Code),
        1 => (user_text(), "[a-z ()]{1,8}").prop_map(|(text, href)| Piece::Link(text, href)),
    ]
}

/// One line built from constructors; neighbouring text pieces are merged
fn built_line() -> impl Strategy<Value = Vec<Element>> {
    prop::collection::vec(piece(), 1..6).prop_map(|pieces| {
        let mut merged: Vec<Piece> = Vec::new();
        for piece in pieces {
            if let Piece::Text(next) = &piece {
                if let Some(Piece::Text(prev)) = merged.last_mut() {
                    prev.push(' ');
                    prev.push_str(next);
                    continue;
                }
            }
            merged.push(piece);
        }

        let mut elements: Vec<Element> = merged
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => Element::text(text),
                Piece::Bold(text) => Element::bold(text),
                Piece::Italic(text) => Element::italic(text),
                Piece::Code(code) => Element::code(code),
                Piece::Link(text, href) => Element::link(text, href),
            })
            .collect();
        if let Some(last) = elements.pop() {
            elements.push(last.ln());
        }
        elements
    })
}

proptest! {
    #[test]
    fn constructor_trees_survive_round_trip(built in built_line()) {
        let markdown = render(&built);
        let one_pass = parse(&markdown).elements;
        let pipeline = parse_tokens(&tokenize(&markdown)).elements;

        prop_assert_eq!(&one_pass, &pipeline);
        prop_assert_eq!(one_pass.len(), built.len());
        for (parsed, original) in one_pass.iter().zip(&built) {
            prop_assert_eq!(parsed.kind, original.kind);
            prop_assert_eq!(parsed.plain_text(), original.plain_text());
            prop_assert_eq!(parsed.decoded_href(), original.decoded_href());
        }
        prop_assert_eq!(&one_pass, &built);
    }

    #[test]
    fn lexing_is_lossless(s in any::<String>()) {
        let tokens = tokenize(&s);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(roundmark::TokenKind::Eof));
        prop_assert_eq!(source_text(&tokens), s);
    }

    #[test]
    fn canonical_documents_round_trip(doc in document()) {
        let one_pass = render(&parse(&doc).elements);
        let pipeline = render(&parse_tokens(&tokenize(&doc)).elements);
        prop_assert_eq!(&one_pass, &pipeline);
        prop_assert_eq!(&one_pass, &doc);
    }

    #[test]
    fn arbitrary_input_renders_clean(s in "[a-z0-9 \t\n#*_\\[\\]()`!.)-]{0,200}") {
        for elements in [parse(&s).elements, parse_tokens(&tokenize(&s)).elements] {
            let out = render(&elements);
            prop_assert!(out.ends_with('\n'));
            prop_assert!(!out.contains("\n\n\n"));
            for line in out.lines() {
                prop_assert!(!line.ends_with(' ') && !line.ends_with('\t'));
            }

            let mut levels_ok = true;
            walk(&elements, |e| {
                if e.kind == Kind::Heading && !(1..=6).contains(&e.level) {
                    levels_ok = false;
                }
            });
            prop_assert!(levels_ok);
        }
    }
}
