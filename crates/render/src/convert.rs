//! Markdown to HTML conversion around the code block pass.

use crate::highlight::Highlighter;
use crate::options::Options;
use crate::transform::CodeBlockPass;
use fenceline_core::normalize::protect_delimiters;
use fenceline_core::{
    ConversionContext, ExtensionHooks, FencelineError, ParseDiagnostics, SourceLocation,
    TokenTable,
};
use markdown::message::{Message, Place};

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Final HTML with every code block restored.
    pub html: String,
    /// Blocks protected during conversion.
    pub tokens: TokenTable,
    /// Warnings and recovered errors.
    pub diagnostics: ParseDiagnostics,
}

/// Converts documents with a shared highlighter.
///
/// Each call to [`Converter::convert`] owns a fresh [`ConversionContext`], so
/// one converter can serve many documents.
#[derive(Debug)]
pub struct Converter {
    options: Options,
    highlighter: Highlighter,
    hooks: ExtensionHooks,
}

impl Converter {
    /// Creates a converter without hooks.
    pub fn new(highlighter: Highlighter, options: Options) -> Self {
        Self {
            options,
            highlighter,
            hooks: ExtensionHooks::new(),
        }
    }

    /// Replaces the hook registry.
    pub fn with_hooks(mut self, hooks: ExtensionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Converts a markdown document to HTML.
    pub fn convert(&self, input: &str) -> Result<Conversion, FencelineError> {
        let mut ctx = ConversionContext::new();

        let protected = protect_delimiters(input);
        let pass = CodeBlockPass::new(&self.options, &self.highlighter, &self.hooks);
        let text = pass.run(&protected, &mut ctx);

        let html = markdown::to_html_with_options(&text, &markdown_options()).map_err(|err| {
            FencelineError::MarkdownAdapter {
                message: err.to_string(),
                location: message_location(&err),
            }
        })?;
        let html = ctx.tokens.restore(&html);

        Ok(Conversion {
            html,
            tokens: ctx.tokens,
            diagnostics: ctx.diagnostics,
        })
    }
}

fn markdown_options() -> markdown::Options {
    let mut options = markdown::Options::gfm();
    options.compile.allow_dangerous_html = true;
    options
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}
