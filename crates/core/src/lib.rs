#![deny(missing_docs)]
//! fenceline core: fenced code block scanning, info strings, diff markup, and
//! the placeholder token table shared with the restoration pass.

/// Fenced code block detection.
pub mod code_fence;
/// Per-conversion state.
pub mod context;
/// Line-level diff markup.
pub mod diff;
/// Core error and diagnostic types.
pub mod error;
/// Before/after extension hooks.
pub mod hooks;
/// Info string (language + attributes) parsing.
pub mod info_string;
/// Code normalization and host escape sequences.
pub mod normalize;
/// Placeholder tokens and restoration.
pub mod tokens;

pub use code_fence::{
    FenceMatch, FencePhase, FenceScanner, FenceState, LineParseOutcome, UnclosedFence,
    advance_fence_state,
};
pub use context::ConversionContext;
pub use diff::{DiffDirective, DiffKind, annotate, annotate_text, parse_directives};
pub use error::{FencelineError, ParseDiagnostics, ParseWarning, RecoverableError, SourceLocation};
pub use hooks::{ExtensionHooks, HookPoint, TextTransform};
pub use info_string::{Attributes, InfoString, parse_info};
pub use tokens::{TokenEntry, TokenTable, placeholder};
