//! Highlighter configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default theme, bundled with syntect.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Default location of the Handlebars grammar fetched at startup.
pub const HANDLEBARS_GRAMMAR_URL: &str =
    "https://raw.githubusercontent.com/daaain/Handlebars/master/grammars/Handlebars.sublime-syntax";

/// Settings for the one-time highlighter initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Theme name from the bundled theme set.
    pub theme: String,
    /// Baseline languages expected to resolve once initialized.
    pub languages: Vec<String>,
    /// External grammar definitions fetched and registered at startup.
    pub grammars: Vec<GrammarConfig>,
    /// Languages expected to ship with the engine (checked, never fetched).
    pub bundled_languages: Vec<String>,
    /// Language id to engine token mapping, consulted before lookup.
    pub aliases: BTreeMap<String, String>,
    /// Location of a packed syntax set replacing the bundled one.
    pub syntax_dump: Option<String>,
    /// Retry policy for every fetch.
    pub retry: RetryConfig,
    /// Per-request timeout.
    pub fetch_timeout_secs: u64,
    /// Keep starting when resources fail: skip the failed resource, or fall
    /// back to unhighlighted output if the engine cannot be built at all.
    pub degrade_on_failure: bool,
}

impl HighlightConfig {
    /// Configuration that never touches the network.
    pub fn offline() -> Self {
        Self {
            grammars: Vec::new(),
            ..Self::default()
        }
    }

    /// Timeout applied to each fetch.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            languages: vec!["js".to_string(), "css".to_string(), "ts".to_string()],
            grammars: vec![GrammarConfig::handlebars()],
            bundled_languages: vec!["glimmer-js".to_string(), "glimmer-ts".to_string()],
            aliases: default_aliases(),
            syntax_dump: None,
            retry: RetryConfig::default(),
            fetch_timeout_secs: 30,
            degrade_on_failure: true,
        }
    }
}

/// Aliases for ids the bundled syntax set has no grammar for.
pub fn default_aliases() -> BTreeMap<String, String> {
    [
        ("ts", "js"),
        ("typescript", "js"),
        ("glimmer-js", "js"),
        ("glimmer-ts", "js"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// An external grammar (sublime-syntax YAML) registered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarConfig {
    /// Display name, also usable as a language id.
    pub name: String,
    /// Scope name assigned to the grammar.
    pub scope_name: String,
    /// Extra language ids that select this grammar.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// URL (`http://`, `https://`) or local path of the definition.
    pub location: String,
}

impl GrammarConfig {
    /// Handlebars templates, aliased `hbs`.
    pub fn handlebars() -> Self {
        Self {
            name: "handlebars".to_string(),
            scope_name: "text.html.handlebars".to_string(),
            aliases: vec!["hbs".to_string()],
            location: HANDLEBARS_GRAMMAR_URL.to_string(),
        }
    }

    /// Name plus aliases.
    pub fn language_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Exponential backoff for resource fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff_ms: u64,
    /// Upper bound for the delay.
    pub max_backoff_ms: u64,
}

impl RetryConfig {
    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}
