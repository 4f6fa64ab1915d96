//! syntect-backed highlighting engine.

use super::config::{DEFAULT_THEME, default_aliases};
use super::{HighlightEngine, HighlightedCode};
use fenceline_core::FencelineError;
use std::collections::BTreeMap;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Style, Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Highlights with a syntect syntax set and a single theme.
pub struct SyntectEngine {
    syntaxes: SyntaxSet,
    theme: Theme,
    aliases: BTreeMap<String, String>,
}

impl SyntectEngine {
    /// Creates an engine from parts.
    pub fn new(syntaxes: SyntaxSet, theme: Theme, aliases: BTreeMap<String, String>) -> Self {
        Self {
            syntaxes,
            theme,
            aliases,
        }
    }

    /// Engine over the bundled syntaxes with the default theme and aliases.
    pub fn bundled() -> Result<Self, FencelineError> {
        Ok(Self::new(
            SyntaxSet::load_defaults_newlines(),
            load_theme(DEFAULT_THEME)?,
            default_aliases(),
        ))
    }

    /// The syntax set in use.
    pub fn syntaxes(&self) -> &SyntaxSet {
        &self.syntaxes
    }

    fn resolve(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }
        let token = self
            .aliases
            .get(language)
            .map(String::as_str)
            .unwrap_or(language);
        self.syntaxes.find_syntax_by_token(token)
    }

    fn open_tag(&self, language: &str) -> String {
        let background = self.theme.settings.background.unwrap_or(Color::WHITE);
        let mut open = format!(
            r#"<pre class="syntect" style="background-color:#{:02x}{:02x}{:02x};""#,
            background.r, background.g, background.b
        );
        if !language.is_empty() {
            open.push_str(&format!(
                r#" data-language="{}""#,
                html_escape::encode_double_quoted_attribute(language)
            ));
        }
        open.push_str("><code>");
        open
    }
}

impl HighlightEngine for SyntectEngine {
    fn name(&self) -> &str {
        "syntect"
    }

    fn supports(&self, language: &str) -> bool {
        self.resolve(language).is_some()
    }

    fn render(&self, code: &str, language: &str) -> Result<HighlightedCode, FencelineError> {
        let syntax = self
            .resolve(language)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let regions = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(|err| FencelineError::highlight(language, err.to_string()))?;
            // Line terminators belong to the join, not to the line's markup.
            let regions: Vec<(Style, &str)> = regions
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    (!text.is_empty()).then_some((style, text))
                })
                .collect();
            let html = styled_line_to_highlighted_html(&regions, IncludeBackground::No)
                .map_err(|err| FencelineError::highlight(language, err.to_string()))?;
            lines.push(html);
        }
        if code.ends_with('\n') {
            lines.push(String::new());
        }

        Ok(HighlightedCode {
            open: self.open_tag(language),
            lines,
            close: "</code></pre>".to_string(),
        })
    }
}

/// Loads a bundled theme by name.
pub fn load_theme(name: &str) -> Result<Theme, FencelineError> {
    let mut themes = ThemeSet::load_defaults().themes;
    match themes.remove(name) {
        Some(theme) => Ok(theme),
        None => Err(FencelineError::Config(format!(
            "unknown theme '{}' (available: {})",
            name,
            themes.keys().cloned().collect::<Vec<_>>().join(", ")
        ))),
    }
}
