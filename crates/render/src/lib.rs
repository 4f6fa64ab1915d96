#![deny(missing_docs)]
//! fenceline render engine: highlighting, block markup, the code block pass
//! and markdown conversion.

/// Block markup (code block container, filename ribbon).
pub mod block;
/// Markdown to HTML conversion.
pub mod convert;
/// Syntax highlighting engines and their one-time initialization.
pub mod highlight;
/// Pass options.
pub mod options;
/// Document transforms (fenced code block pass).
pub mod transform;

pub use block::{FILENAME_ATTRIBUTE, render_block};
pub use convert::{Conversion, Converter};
pub use highlight::{
    HighlightConfig, HighlightEngine, HighlightedCode, Highlighter, HighlighterCell, HttpSource,
    ResourceSource,
};
pub use options::Options;
pub use transform::{CodeBlockPass, process_document};
