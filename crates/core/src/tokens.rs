//! Placeholder tokens for rendered code blocks.
//!
//! Each rendered block is replaced in the document by `¨G<n>G` and stored in a
//! [`TokenTable`] so later markdown stages cannot reinterpret its HTML. A
//! restoration pass splices the HTML back in once conversion is done.

use serde::Serialize;
use std::fmt::Write as _;

use crate::normalize::DELIMITER;

/// [`DELIMITER`] as it appears in a percent-encoded URL.
const PERCENT_DELIMITER: &str = "%C2%A8";
/// The `¨T` escape as it appears in a percent-encoded URL.
const PERCENT_ESCAPE: &str = "%C2%A8T";

/// One protected block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEntry {
    /// Position in the table; also the number inside the placeholder.
    pub index: usize,
    /// The whole fence as it appeared in the input.
    pub original_text: String,
    /// Final HTML for the block.
    pub rendered_html: String,
}

/// Placeholder text for a token index.
///
/// ```
/// assert_eq!(fenceline_core::tokens::placeholder(3), "¨G3G");
/// ```
pub fn placeholder(index: usize) -> String {
    format!("{DELIMITER}G{index}G")
}

/// Table of protected blocks owned by a single conversion.
///
/// Indices are dense and assigned in allocation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenTable {
    entries: Vec<TokenEntry>,
}

impl TokenTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a block and returns its index.
    pub fn allocate(&mut self, original_text: impl Into<String>, rendered_html: String) -> usize {
        let index = self.entries.len();
        self.entries.push(TokenEntry {
            index,
            original_text: original_text.into(),
            rendered_html,
        });
        index
    }

    /// Looks up an entry.
    pub fn get(&self, index: usize) -> Option<&TokenEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no block has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces every known placeholder with its stored HTML and decodes
    /// `¨T` back to `¨`, in one left-to-right scan.
    ///
    /// User text is expected to be escaped with
    /// [`protect_delimiters`](crate::normalize::protect_delimiters), so an
    /// escaped `¨TG0G` is never taken for a placeholder. A placeholder left
    /// alone in a paragraph (`<p>¨G0G</p>`) is unwrapped; unknown indices and
    /// other `¨` sequences are left untouched. Link destinations carry the
    /// escape percent-encoded (`%C2%A8T`), which is decoded the same way.
    pub fn restore(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len() + self.html_len());
        let mut rest = html;

        while let Some(pos) = rest.find([DELIMITER, '%']) {
            out.push_str(&rest[..pos]);
            if rest[pos..].starts_with('%') {
                match rest[pos..].strip_prefix(PERCENT_ESCAPE) {
                    Some(tail) if tail.starts_with(['G', 'T', 'D']) => {
                        out.push_str(PERCENT_DELIMITER);
                        rest = tail;
                    }
                    _ => {
                        out.push('%');
                        rest = &rest[pos + 1..];
                    }
                }
                continue;
            }
            let after = &rest[pos + DELIMITER.len_utf8()..];

            if let Some(tail) = after.strip_prefix('T') {
                out.push(DELIMITER);
                rest = tail;
                continue;
            }
            if let Some((index, tail)) = parse_placeholder(after)
                && let Some(entry) = self.get(index)
            {
                let mut tail = tail;
                if out.ends_with("<p>")
                    && let Some(stripped) = tail.strip_prefix("</p>")
                {
                    out.truncate(out.len() - "<p>".len());
                    tail = stripped;
                }
                out.push_str(&entry.rendered_html);
                rest = tail;
                continue;
            }

            out.push(DELIMITER);
            rest = after;
        }
        out.push_str(rest);
        out
    }

    fn html_len(&self) -> usize {
        self.entries.iter().map(|e| e.rendered_html.len()).sum()
    }

    /// Debug listing of the table, one line per entry.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let first_line = entry.original_text.lines().next().unwrap_or_default();
            writeln!(
                out,
                "{} {} ({} bytes of html)",
                placeholder(entry.index),
                first_line,
                entry.rendered_html.len()
            )
            .ok();
        }
        out
    }
}

/// Parses `G<digits>G` at the start of `text`.
fn parse_placeholder(text: &str) -> Option<(usize, &str)> {
    let digits_and_rest = text.strip_prefix('G')?;
    let digit_len = digits_and_rest
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digit_len == 0 {
        return None;
    }
    let tail = digits_and_rest[digit_len..].strip_prefix('G')?;
    let index = digits_and_rest[..digit_len].parse().ok()?;
    Some((index, tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(blocks: &[(&str, &str)]) -> TokenTable {
        let mut table = TokenTable::new();
        for (original, html) in blocks {
            table.allocate(*original, html.to_string());
        }
        table
    }

    #[test]
    fn allocates_dense_indices() {
        let mut table = TokenTable::new();
        assert!(table.is_empty());
        assert_eq!(table.allocate("```\na\n```", "<a>".to_string()), 0);
        assert_eq!(table.allocate("```\nb\n```", "<b>".to_string()), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).map(|e| e.original_text.as_str()), Some("```\nb\n```"));
    }

    #[test]
    fn restore_replaces_known_placeholders() {
        let table = table_with(&[("x", "<div>zero</div>"), ("y", "<div>one</div>")]);
        let text = "a\n\n¨G1G\n\nb ¨G0G c ¨G7G ¨Gx";
        assert_eq!(
            table.restore(text),
            "a\n\n<div>one</div>\n\nb <div>zero</div> c ¨G7G ¨Gx"
        );
    }

    #[test]
    fn restore_unwraps_paragraphs_and_decodes_delimiters() {
        let table = table_with(&[("x", "<div class=\"code-block\">¨T $</div>")]);
        let html = "<p>price $3 ¨D ¨z</p>\n<p>¨G0G</p>\n<p>¨TG0G ¨TT</p>";
        assert_eq!(
            table.restore(html),
            "<p>price $3 ¨D ¨z</p>\n<div class=\"code-block\">¨T $</div>\n<p>¨G0G ¨T</p>"
        );
    }

    #[test]
    fn restore_decodes_percent_encoded_escapes() {
        let table = table_with(&[("x", "<pre>%C2%A8TG</pre>")]);
        let html = r#"<a href="http://x.test/%C2%A8TG0G?p=100%">¨G0G</a> %C2%A8Tx %"#;
        assert_eq!(
            table.restore(html),
            r#"<a href="http://x.test/%C2%A8G0G?p=100%"><pre>%C2%A8TG</pre></a> %C2%A8Tx %"#
        );
    }

    #[test]
    fn serializes_entries() {
        let table = table_with(&[("```\na\n```", "<pre>a</pre>")]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["entries"][0]["index"], 0);
        assert_eq!(json["entries"][0]["originalText"], "```\na\n```");
        assert_eq!(json["entries"][0]["renderedHtml"], "<pre>a</pre>");
    }

    #[test]
    fn summary_lists_each_entry() {
        let table = table_with(&[("```js\nlet a;\n```", "<pre></pre>")]);
        assert_eq!(table.summary(), "¨G0G ```js (11 bytes of html)\n");
    }
}
