//! Options for the code block pass.

use serde::{Deserialize, Serialize};

/// Options controlling the code block pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Whether fenced code blocks are highlighted and protected by this pass.
    /// When disabled the pass returns its input unchanged and the markdown
    /// converter's own fenced code handling applies.
    #[serde(default = "default_gh_code_blocks")]
    pub gh_code_blocks: bool,
    /// Skip the trailing newline after each highlighted block.
    #[serde(default)]
    pub omit_extra_wl_in_code_blocks: bool,
    /// Info string attribute holding diff directives (e.g. `diff` for
    /// `{diff="+2,-4"}`). Diff markup is off when unset.
    #[serde(default)]
    pub diff_attribute: Option<String>,
}

impl Options {
    /// Returns the configured diff attribute name, if any.
    pub fn diff_attribute(&self) -> Option<&str> {
        self.diff_attribute.as_deref().filter(|name| !name.is_empty())
    }
}

fn default_gh_code_blocks() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gh_code_blocks: default_gh_code_blocks(),
            omit_extra_wl_in_code_blocks: false,
            diff_attribute: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());
        assert!(options.gh_code_blocks);
        assert_eq!(options.diff_attribute(), None);
    }

    #[test]
    fn empty_diff_attribute_is_disabled() {
        let options: Options =
            serde_yaml::from_str("gh_code_blocks: false\ndiff_attribute: \"\"").unwrap();
        assert!(!options.gh_code_blocks);
        assert_eq!(options.diff_attribute(), None);
    }
}
