//! Unhighlighted rendering, used for unknown failures and degraded mode.

use super::{HighlightEngine, HighlightedCode};
use fenceline_core::FencelineError;

/// Engine that escapes code without tokenizing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainEngine;

impl HighlightEngine for PlainEngine {
    fn name(&self) -> &str {
        "plain"
    }

    fn supports(&self, _language: &str) -> bool {
        false
    }

    fn render(&self, code: &str, language: &str) -> Result<HighlightedCode, FencelineError> {
        Ok(render_plain(code, language))
    }
}

/// Escaped `<pre><code>` rendering of `code`.
pub fn render_plain(code: &str, language: &str) -> HighlightedCode {
    let open = if language.is_empty() {
        r#"<pre class="plain"><code>"#.to_string()
    } else {
        format!(
            r#"<pre class="plain"><code class="language-{}">"#,
            html_escape::encode_double_quoted_attribute(language)
        )
    };
    HighlightedCode {
        open,
        lines: code
            .split('\n')
            .map(|line| html_escape::encode_text(line).into_owned())
            .collect(),
        close: "</code></pre>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        let html = render_plain("<b>&</b>", "html").into_html();
        insta::assert_snapshot!(html, @r#"<pre class="plain"><code class="language-html">&lt;b&gt;&amp;&lt;/b&gt;</code></pre>"#);
    }

    #[test]
    fn keeps_one_entry_per_line() {
        let code = render_plain("a\n\nb", "");
        assert_eq!(code.lines, ["a", "", "b"]);
    }

    #[test]
    fn no_language_class_when_empty() {
        let code = render_plain("a", "");
        assert_eq!(code.open, r#"<pre class="plain"><code>"#);
        assert_eq!(code.lines, ["a"]);
    }
}
