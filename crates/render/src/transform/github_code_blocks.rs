//! Fenced code block pass.
//!
//! Every complete fence in the document is normalized, highlighted, wrapped
//! in block markup and stored in the conversion's token table. The fence
//! itself, together with the line break before it, is replaced by
//! `\n\n¨G<n>G\n\n` so later markdown stages never see the rendered HTML.

use crate::block::render_block;
use crate::highlight::plain::render_plain;
use crate::highlight::{HighlightedCode, Highlighter};
use crate::options::Options;
use fenceline_core::normalize::{decode_host_sequences, normalize_code};
use fenceline_core::{
    ConversionContext, ExtensionHooks, FenceMatch, FenceScanner, HookPoint, ParseDiagnostics,
    ParseWarning, SourceLocation, annotate, parse_directives, parse_info, placeholder,
};
use std::borrow::Cow;

/// The code block pass, bound to its options, highlighter and hooks.
#[derive(Debug, Clone, Copy)]
pub struct CodeBlockPass<'a> {
    options: &'a Options,
    highlighter: &'a Highlighter,
    hooks: &'a ExtensionHooks,
}

impl<'a> CodeBlockPass<'a> {
    /// Creates a pass.
    pub fn new(options: &'a Options, highlighter: &'a Highlighter, hooks: &'a ExtensionHooks) -> Self {
        Self {
            options,
            highlighter,
            hooks,
        }
    }

    /// Replaces every fenced block in `text` with a placeholder and records
    /// the rendered block in `ctx.tokens`.
    ///
    /// Returns `text` unchanged when `gh_code_blocks` is off; hooks do not run
    /// in that case either.
    pub fn run(&self, text: &str, ctx: &mut ConversionContext) -> String {
        if !self.options.gh_code_blocks {
            return text.to_string();
        }

        let text = self.hooks.dispatch(HookPoint::Before, Cow::Borrowed(text));
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        let mut scanner = FenceScanner::new(&text);
        for fence in scanner.by_ref() {
            out.push_str(strip_line_break(&text[last..fence.range.start]));
            let html = self.render_fence(&fence, &mut ctx.diagnostics);
            let index = ctx.tokens.allocate(fence.text, html);
            log::debug!(
                "Stored {}-line {} block at line {} as token {}",
                fence.body.lines().count(),
                fence.delimiter(),
                fence.line,
                index
            );
            out.push_str("\n\n");
            out.push_str(&placeholder(index));
            out.push_str("\n\n");
            last = fence.range.end;
        }
        out.push_str(&text[last..]);

        for unclosed in scanner.take_unclosed() {
            ctx.diagnostics.add_warning(ParseWarning::UnclosedCodeFence {
                location: SourceLocation::new(unclosed.line, 1),
                marker: unclosed.marker,
                context: unclosed.context,
            });
        }

        self.hooks
            .dispatch(HookPoint::After, Cow::Owned(out))
            .into_owned()
    }

    fn render_fence(&self, fence: &FenceMatch<'_>, diagnostics: &mut ParseDiagnostics) -> String {
        let info = parse_info(fence.info);
        let code = normalize_code(fence.body);
        // The highlighter sees literal `$` and `¨`, not the host's escapes.
        let code = decode_host_sequences(&code);

        let mut highlighted = self.highlight(&code, &info.language, fence.line, diagnostics);

        if let Some(name) = self.options.diff_attribute()
            && let Some(list) = info.attributes.get(name)
        {
            let directives = parse_directives(list);
            let line_count = highlighted.lines.len();
            for skipped in annotate(&mut highlighted.lines, &directives) {
                diagnostics.add_warning(ParseWarning::DiffOutOfRange {
                    location: SourceLocation::new(fence.line, 1),
                    directive: skipped.to_string(),
                    line_count,
                });
            }
        }

        let mut html = highlighted.into_html();
        if !self.options.omit_extra_wl_in_code_blocks {
            html.push('\n');
        }
        render_block(&html, &info.language, &info.attributes)
    }

    fn highlight(
        &self,
        code: &str,
        language: &str,
        line: usize,
        diagnostics: &mut ParseDiagnostics,
    ) -> HighlightedCode {
        match self.highlighter.highlight(code, language) {
            Ok(highlighted) => highlighted,
            Err(err) => {
                log::warn!("Block at line {} rendered unhighlighted: {}", line, err);
                diagnostics.add_error_at(
                    format!("{}; block rendered as plain text", err),
                    line,
                    1,
                );
                render_plain(code, language)
            }
        }
    }
}

/// Drops one trailing `\n` or `\r\n`.
fn strip_line_break(text: &str) -> &str {
    match text.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => text,
    }
}

/// Runs the pass with no hooks registered.
pub fn process_document(
    text: &str,
    options: &Options,
    highlighter: &Highlighter,
    ctx: &mut ConversionContext,
) -> String {
    let hooks = ExtensionHooks::new();
    CodeBlockPass::new(options, highlighter, &hooks).run(text, ctx)
}
