//! Config file loading.

use anyhow::{Context, Result, bail};
use fenceline_render::{HighlightConfig, Options};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a `fenceline.yaml` / `fenceline.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub options: Options,
    pub highlight: HighlightConfig,
}

impl AppConfig {
    /// Loads a config file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::parse(&text, extension).with_context(|| format!("parsing config {}", path.display()))
    }

    fn parse(text: &str, extension: &str) -> Result<Self> {
        match extension {
            "json" => Ok(serde_json::from_str(text)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(text)?),
            other => bail!("unsupported config format '{}' (expected json, yaml or yml)", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_sections_merge_with_defaults() {
        let config = AppConfig::parse(
            "options:\n  omit_extra_wl_in_code_blocks: true\nhighlight:\n  theme: InspiredGitHub\n",
            "yaml",
        )
        .unwrap();
        assert!(config.options.gh_code_blocks);
        assert!(config.options.omit_extra_wl_in_code_blocks);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.highlight.grammars.len(), 1);
    }

    #[test]
    fn json_config() {
        let config = AppConfig::parse(
            r#"{"options": {"diff_attribute": "diff"}, "highlight": {"grammars": []}}"#,
            "json",
        )
        .unwrap();
        assert_eq!(config.options.diff_attribute(), Some("diff"));
        assert!(config.highlight.grammars.is_empty());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = AppConfig::parse("", "toml").unwrap_err();
        assert!(err.to_string().contains("unsupported config format 'toml'"));
    }
}
