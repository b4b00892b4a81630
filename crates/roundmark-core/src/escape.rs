//! Escaping helpers for inline text and URLs.
//!
//! Every escape has an inverse, `unescape_*(escape_*(s)) == s`.

/// Characters with inline meaning that constructors escape
pub const INLINE_SPECIALS: &[char] = &['*', '_', '[', ']', '(', ')', '~', '`'];

/// Check if a character is escaped by [`escape_inline`]
pub fn is_inline_special(c: char) -> bool {
    INLINE_SPECIALS.contains(&c)
}

/// Escape inline Markdown special characters with a backslash
pub fn escape_inline(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if is_inline_special(c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Remove the backslashes added by [`escape_inline`]
pub fn unescape_inline(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if is_inline_special(next) {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(c);
    }

    result
}

/// Escape backticks inside a code span
pub fn escape_backticks(code: &str) -> String {
    code.replace('`', "\\`")
}

/// Percent-escape spaces and parentheses in a URL
pub fn escape_url(url: &str) -> String {
    let mut result = String::with_capacity(url.len());

    for c in url.chars() {
        match c {
            ' ' => result.push_str("%20"),
            '(' => result.push_str("%28"),
            ')' => result.push_str("%29"),
            _ => result.push(c),
        }
    }

    result
}

/// Reverse [`escape_url`]
pub fn unescape_url(url: &str) -> String {
    url.replace("%20", " ")
        .replace("%28", "(")
        .replace("%29", ")")
}
