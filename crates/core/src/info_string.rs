//! Info string parsing for fenced code blocks.
//!
//! An info string is the text after an opening fence, e.g.
//! `js {data-filename="app.js" diff="+2,-4"}`. The leading word is the
//! language; the optional brace segment holds space separated `key=value`
//! attributes. Parsing is permissive and never fails.

use std::collections::HashMap;

/// Attributes parsed from the `{...}` segment of an info string.
///
/// A key written without `=` is present with no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: HashMap<String, Option<String>>,
}

impl Attributes {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.entries.insert(key.into(), value);
    }

    /// Returns the attribute's value, or `None` when absent or valueless.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    /// Returns true when the key is present, with or without a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over key/value pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// Language and attributes extracted from an info string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoString {
    /// First word of the info string, or empty.
    pub language: String,
    /// Parsed `{...}` attributes.
    pub attributes: Attributes,
}

/// Parses an info string into a language and attributes.
///
/// # Examples
///
/// ```
/// use fenceline_core::info_string::parse_info;
///
/// let info = parse_info(r#"js {data-filename="app.js" hidden}"#);
/// assert_eq!(info.language, "js");
/// assert_eq!(info.attributes.get("data-filename"), Some("app.js"));
/// assert!(info.attributes.contains_key("hidden"));
/// assert_eq!(info.attributes.get("hidden"), None);
/// ```
pub fn parse_info(info: &str) -> InfoString {
    let trimmed = info.trim_start();
    let word_len = trimmed
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let language = trimmed[..word_len].to_string();

    let rest = trimmed[word_len..].trim_start();
    let attributes = match brace_segment(rest) {
        Some(segment) => parse_attributes(segment),
        None => Attributes::new(),
    };

    InfoString {
        language,
        attributes,
    }
}

/// Returns the text inside a leading `{...}`, if closed.
fn brace_segment(rest: &str) -> Option<&str> {
    let inner = rest.strip_prefix('{')?;
    let close = inner.find('}')?;
    Some(&inner[..close])
}

fn parse_attributes(segment: &str) -> Attributes {
    let mut attributes = Attributes::new();
    for piece in segment.split(' ').filter(|p| !p.is_empty()) {
        match piece.split_once('=') {
            Some((key, value)) => attributes.insert(key, Some(strip_quotes(value).to_string())),
            None => attributes.insert(piece, None),
        }
    }
    attributes
}

/// Strips one pair of enclosing double quotes; lone quotes are kept.
fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
