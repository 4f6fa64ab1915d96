//! Code text normalization and host escape sequences.
//!
//! Host converters reserve the private delimiter `¨` for their own markers:
//! `¨G<n>G` placeholders, `¨T` for a literal `¨` and `¨D` for a `$`. Code
//! handed to the highlighter must see the real characters, so the pass
//! decodes `¨T`/`¨D` before highlighting.

use std::borrow::Cow;

/// Tab stop width used by [`detab`].
pub const TAB_WIDTH: usize = 4;

/// Private delimiter reserved by the host converter.
pub const DELIMITER: char = '¨';

/// Expands tabs to spaces at fixed tab stops, per line.
pub fn detab(text: &str) -> Cow<'_, str> {
    if !text.contains('\t') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut column = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let spaces = TAB_WIDTH - (column % TAB_WIDTH);
                out.extend(std::iter::repeat_n(' ', spaces));
                column += spaces;
            }
            '\n' => {
                out.push('\n');
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    Cow::Owned(out)
}

/// Strips leading and trailing newline characters.
///
/// Only line breaks are removed; leading indentation on the first line is kept.
pub fn trim_blank_lines(text: &str) -> &str {
    text.trim_start_matches('\n').trim_end_matches('\n')
}

/// Detab and trim a raw fence body.
pub fn normalize_code(body: &str) -> String {
    let body = body.replace("\r\n", "\n");
    trim_blank_lines(&detab(&body)).to_string()
}

/// Escapes a user `¨` that would otherwise read as a marker (`¨G`, `¨T`,
/// `¨D`) by writing it as `¨T`.
///
/// Every other character, `$` included, passes through, so the markdown
/// converter sees the document's own link destinations and backslash escapes.
pub fn protect_delimiters(text: &str) -> Cow<'_, str> {
    if !text.contains(DELIMITER) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == DELIMITER && matches!(chars.peek(), Some('G' | 'T' | 'D')) {
            out.push('T');
        }
    }
    Cow::Owned(out)
}

/// Restores `¨D` to `$` and `¨T` to `¨`.
///
/// Runs left to right in one pass, so `¨TD` decodes to the literal `¨D`.
pub fn decode_host_sequences(text: &str) -> Cow<'_, str> {
    if !text.contains(DELIMITER) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == DELIMITER {
            match chars.peek() {
                Some('T') => {
                    chars.next();
                    out.push(DELIMITER);
                    continue;
                }
                Some('D') => {
                    chars.next();
                    out.push('$');
                    continue;
                }
                _ => {}
            }
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detab_uses_four_column_stops() {
        assert_eq!(detab("\tx"), "    x");
        assert_eq!(detab("ab\tc"), "ab  c");
        assert_eq!(detab("abcd\te"), "abcd    e");
        assert_eq!(detab("a\n\tb"), "a\n    b");
        assert!(matches!(detab("no tabs"), Cow::Borrowed(_)));
    }

    #[test]
    fn trims_only_newlines() {
        assert_eq!(trim_blank_lines("\n\n  code\n\n"), "  code");
        assert_eq!(trim_blank_lines("code"), "code");
        assert_eq!(trim_blank_lines("\n\n"), "");
    }

    #[test]
    fn normalize_code_combines_steps() {
        assert_eq!(normalize_code("\r\n\tlet a;\r\n\r\n"), "    let a;");
    }

    #[test]
    fn protects_only_marker_like_delimiters() {
        assert_eq!(protect_delimiters("cost: $5 ¨ ¨z"), "cost: $5 ¨ ¨z");
        assert!(matches!(protect_delimiters("cost: $5"), Cow::Borrowed(_)));

        let source = "¨G0G ¨T ¨D ¨";
        let protected = protect_delimiters(source);
        assert_eq!(protected, "¨TG0G ¨TT ¨TD ¨");
        assert_eq!(decode_host_sequences(&protected), source);
    }

    #[test]
    fn decode_maps_dollar_sequence() {
        assert_eq!(decode_host_sequences("echo ¨DHOME ¨TD"), "echo $HOME ¨D");
    }

    #[test]
    fn decode_leaves_other_sequences() {
        assert_eq!(decode_host_sequences("¨G0G"), "¨G0G");
        assert_eq!(decode_host_sequences("plain"), "plain");
    }
}
