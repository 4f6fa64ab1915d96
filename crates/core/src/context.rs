//! Per-conversion state.

use crate::error::ParseDiagnostics;
use crate::tokens::TokenTable;

/// State owned by one document conversion.
///
/// Every conversion gets its own context; concurrent conversions must never
/// share one, since placeholder indices are only unique within a table.
#[derive(Debug, Default)]
pub struct ConversionContext {
    /// Protected blocks, indexed by placeholder number.
    pub tokens: TokenTable,
    /// Warnings and recovered errors collected along the way.
    pub diagnostics: ParseDiagnostics,
}

impl ConversionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }
}
