//! Configuration options for Markdown rendering

/// Options for rendering an element tree.
///
/// The defaults produce the canonical form that both parsers read back
/// unchanged. Other values are fine for one-way output.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Bullet list marker
    pub bullet_marker: char,

    /// Indentation added per enclosing unordered list
    pub indent: String,

    /// Longest run of newlines kept by the final cleanup
    pub max_newlines: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bullet_marker: '-',
            indent: "  ".to_string(),
            max_newlines: 2,
        }
    }
}
