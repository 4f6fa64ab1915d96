//! Final block markup around highlighted code.

use fenceline_core::Attributes;

/// Attribute whose value is shown as the block's filename label.
pub const FILENAME_ATTRIBUTE: &str = "data-filename";

/// Wraps highlighted HTML in the `code-block` container.
///
/// A non-empty `data-filename` attribute adds an outer `filename` container
/// with a ribbon element and the escaped filename as its label; the language,
/// when present, becomes a second class on that container.
pub fn render_block(html: &str, language: &str, attributes: &Attributes) -> String {
    let block = format!(r#"<div class="code-block">{html}</div>"#);

    match attributes.get(FILENAME_ATTRIBUTE) {
        Some(filename) if !filename.is_empty() => {
            let class = if language.is_empty() {
                "filename".to_string()
            } else {
                format!(
                    "filename {}",
                    html_escape::encode_double_quoted_attribute(language)
                )
            };
            format!(
                r#"<div class="{class}"><div class="ribbon"></div><span>{}</span>{block}</div>"#,
                html_escape::encode_text(filename)
            )
        }
        _ => block,
    }
}
