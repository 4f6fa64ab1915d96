//! Syntax highlighting for code blocks.
//!
//! The engine is built once per process by an asynchronous initialization that
//! may fetch grammars over the network. A [`Highlighter`] can only be obtained
//! from a finished initialization (or constructed directly from an engine), so
//! no block is ever highlighted before the engine is ready.
//!
//! # Module Structure
//!
//! - `config` - Initialization settings (theme, grammars, retry policy)
//! - `source` - Resource fetching (HTTP or filesystem) with retry
//! - `syntect_engine` - The syntect-backed engine
//! - `plain` - Unhighlighted fallback engine

pub mod config;
mod init;
pub mod plain;
pub mod source;
pub mod syntect_engine;

pub use config::{GrammarConfig, HighlightConfig, RetryConfig};
pub use plain::PlainEngine;
pub use source::{HttpSource, ResourceSource, fetch_with_retry};
pub use syntect_engine::SyntectEngine;

use fenceline_core::FencelineError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Highlighted code, kept line by line so line markup can be applied after
/// tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedCode {
    /// Opening markup, e.g. `<pre ...><code>`.
    pub open: String,
    /// Inner HTML of each source line, without line terminators.
    pub lines: Vec<String>,
    /// Closing markup.
    pub close: String,
}

impl HighlightedCode {
    /// Joins the lines with `\n` between the opening and closing markup.
    pub fn into_html(self) -> String {
        let body_len: usize = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut html = String::with_capacity(self.open.len() + body_len + self.close.len());
        html.push_str(&self.open);
        html.push_str(&self.lines.join("\n"));
        html.push_str(&self.close);
        html
    }
}

/// A highlighting engine.
pub trait HighlightEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Whether `language` resolves to a grammar other than plain text.
    fn supports(&self, language: &str) -> bool;

    /// Tokenizes `code` under `language` and renders HTML.
    ///
    /// Unknown languages render as plain text.
    fn render(&self, code: &str, language: &str) -> Result<HighlightedCode, FencelineError>;
}

/// Shared handle to an initialized engine.
///
/// Cloning is cheap; the engine is read-only and safe to use from concurrent
/// conversions.
#[derive(Clone)]
pub struct Highlighter {
    engine: Arc<dyn HighlightEngine>,
    degraded: bool,
}

impl Highlighter {
    /// Wraps an engine.
    pub fn new<E: HighlightEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
            degraded: false,
        }
    }

    /// Handle that renders every block unhighlighted.
    pub fn plain() -> Self {
        Self {
            engine: Arc::new(PlainEngine),
            degraded: true,
        }
    }

    /// Runs the one-time initialization described by `config`.
    pub async fn initialize(
        config: &HighlightConfig,
        source: Arc<dyn ResourceSource>,
    ) -> Result<Self, FencelineError> {
        let engine = init::build_engine(config, source).await?;
        Ok(Self::new(engine))
    }

    /// True when this handle fell back to unhighlighted output.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Engine name.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Whether `language` has a grammar.
    pub fn supports(&self, language: &str) -> bool {
        self.engine.supports(language)
    }

    /// Highlights `code` under `language`.
    pub fn highlight(&self, code: &str, language: &str) -> Result<HighlightedCode, FencelineError> {
        self.engine.render(code, language)
    }
}

impl fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlighter")
            .field("engine", &self.engine.name())
            .field("degraded", &self.degraded)
            .finish()
    }
}

/// Holds the process-wide highlighter and initializes it at most once.
///
/// The host owns one cell, awaits [`HighlighterCell::ensure_ready`] before it
/// reports itself ready, and passes the returned handle to every conversion.
#[derive(Default)]
pub struct HighlighterCell {
    cell: OnceCell<Highlighter>,
}

impl HighlighterCell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// The highlighter, if initialization already finished.
    pub fn get(&self) -> Option<&Highlighter> {
        self.cell.get()
    }

    /// Initializes the highlighter on first call; later calls (including
    /// concurrent ones) wait for and return the same handle.
    ///
    /// With `degrade_on_failure`, a failed initialization yields
    /// [`Highlighter::plain`] instead of an error.
    pub async fn ensure_ready(
        &self,
        config: &HighlightConfig,
        source: Arc<dyn ResourceSource>,
    ) -> Result<&Highlighter, FencelineError> {
        self.cell
            .get_or_try_init(|| async move {
                match Highlighter::initialize(config, source).await {
                    Ok(highlighter) => Ok(highlighter),
                    Err(err) if config.degrade_on_failure => {
                        log::warn!(
                            "Highlighter initialization failed, rendering code unhighlighted: {}",
                            err
                        );
                        Ok(Highlighter::plain())
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }
}

impl fmt::Debug for HighlighterCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlighterCell")
            .field("highlighter", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_html_joins_lines() {
        let code = HighlightedCode {
            open: "<pre><code>".to_string(),
            lines: vec!["a".to_string(), String::new(), "b".to_string()],
            close: "</code></pre>".to_string(),
        };
        assert_eq!(code.into_html(), "<pre><code>a\n\nb</code></pre>");
    }

    #[test]
    fn plain_handle_is_degraded() {
        let highlighter = Highlighter::plain();
        assert!(highlighter.is_degraded());
        assert_eq!(highlighter.engine_name(), "plain");
        assert!(!highlighter.supports("js"));
    }

    #[test]
    fn cell_starts_empty() {
        let cell = HighlighterCell::new();
        assert!(cell.get().is_none());
    }
}
