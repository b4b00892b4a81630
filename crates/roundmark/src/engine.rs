//! Parse engines and the engine registry
//!
//! Both parsers sit behind [`Engine`] so callers and tests can pick one by
//! name at runtime. They must render identically on canonical input.

use std::io::Read;

use indexmap::IndexMap;

use roundmark_core::Document;

use crate::cancel::Cancellation;
use crate::{lexer::Lexer, one_pass, token_parser};
use crate::{Error, Interrupted, Result};

/// A Markdown parser producing a [`Document`]
pub trait Engine: Send + Sync {
    /// Name the engine is registered under
    fn name(&self) -> &str;

    /// Parse `text`, returning the partial document when interrupted
    fn parse(
        &self,
        text: &str,
        cancel: &Cancellation,
    ) -> std::result::Result<Document, Interrupted<Document>>;
}

/// Line scanner working directly on the text
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePass;

impl Engine for OnePass {
    fn name(&self) -> &str {
        "one-pass"
    }

    fn parse(
        &self,
        text: &str,
        cancel: &Cancellation,
    ) -> std::result::Result<Document, Interrupted<Document>> {
        one_pass::parse(text, cancel)
    }
}

/// Lexer followed by the token parser
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    lexer: Lexer,
}

impl Pipeline {
    pub fn new(lexer: Lexer) -> Self {
        Self { lexer }
    }

    /// Parse everything `reader` yields.
    ///
    /// When lexing stops early, the tokens lexed so far are still parsed and
    /// returned as the partial document.
    pub fn parse_reader<R: Read>(
        &self,
        reader: R,
        cancel: &Cancellation,
    ) -> std::result::Result<Document, Interrupted<Document>> {
        let tab_width = self.lexer.options().tab_width;

        match self.lexer.tokenize(reader, cancel) {
            Ok(tokens) => token_parser::parse_with_tab_width(&tokens, tab_width, cancel),
            Err(interrupted) => {
                let (tokens, error) = interrupted.into_parts();
                // the partial tokens are finite, so this parse runs to the end
                let partial =
                    token_parser::parse_with_tab_width(&tokens, tab_width, &Cancellation::never())
                        .unwrap_or_else(|interrupted| interrupted.partial);
                Err(Interrupted::new(partial, error))
            }
        }
    }
}

impl Engine for Pipeline {
    fn name(&self) -> &str {
        "pipeline"
    }

    fn parse(
        &self,
        text: &str,
        cancel: &Cancellation,
    ) -> std::result::Result<Document, Interrupted<Document>> {
        self.parse_reader(text.as_bytes(), cancel)
    }
}

/// Registry of parse engines by name, in registration order
pub struct Engines {
    engines: IndexMap<String, Box<dyn Engine>>,
}

impl Engines {
    /// Create a registry holding both built-in engines
    pub fn new() -> Self {
        let mut engines = Self::empty();
        engines.register(OnePass);
        engines.register(Pipeline::default());
        engines
    }

    pub fn empty() -> Self {
        Self {
            engines: IndexMap::new(),
        }
    }

    /// Register an engine, replacing any engine with the same name
    pub fn register<E: Engine + 'static>(&mut self, engine: E) {
        self.engines
            .insert(engine.name().to_string(), Box::new(engine));
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Result<&dyn Engine> {
        self.engines
            .get(name)
            .map(|engine| engine.as_ref())
            .ok_or_else(|| Error::UnknownEngine(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Engine names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Engine> {
        self.engines.values().map(|engine| engine.as_ref())
    }
}

impl Default for Engines {
    fn default() -> Self {
        Self::new()
    }
}
