//! Document-level transforms run before markdown conversion.
//!
//! - `github_code_blocks`: highlights fenced code blocks and replaces each
//!   with a placeholder token.

/// Fenced code block highlighting pass.
pub mod github_code_blocks;

pub use github_code_blocks::{CodeBlockPass, process_document};
