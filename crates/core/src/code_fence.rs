//! Fenced code block detection.
//!
//! [`advance_fence_state`] tracks fence state one line at a time. [`FenceScanner`]
//! drives it across a whole document and yields each complete fenced region
//! as a [`FenceMatch`], recording openers that never close.

use std::ops::Range;

/// Fence parsing phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FencePhase {
    /// Not currently inside a fence.
    #[default]
    Outside,
    /// Within fence contents.
    InsideFence,
}

/// Current fence state (phase, marker, indent, and length).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceState {
    /// Current fence phase.
    pub phase: FencePhase,
    /// Fence marker character (``` or ~~~).
    pub marker: Option<char>,
    /// Leading whitespace count captured at opening.
    pub indent: usize,
    /// Length of the opening fence (number of ` or ~ characters).
    pub length: usize,
}

impl Default for FenceState {
    fn default() -> Self {
        FenceState {
            phase: FencePhase::Outside,
            marker: None,
            indent: 0,
            length: 0,
        }
    }
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParseOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// Whether this line belongs to a fence (opener, body, or closer).
    pub in_fence: bool,
}

/// Advance fence state based on a single line of text.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineParseOutcome {
    let (visual_indent, byte_offset) = leading_whitespace_info(line);
    let after_indent = &line[byte_offset..];

    let mut next_state = state;
    let mut in_fence = matches!(state.phase, FencePhase::InsideFence);

    if matches!(state.phase, FencePhase::Outside) && visual_indent <= 3 {
        // CommonMark: fence opener must have 0-3 spaces of indentation
        // 4+ spaces = indented code block, not a fenced code block
        if let Some((marker, length)) = detect_fence_marker_with_length(after_indent)
            && is_valid_info(marker, &after_indent[length..])
        {
            next_state = FenceState {
                phase: FencePhase::InsideFence,
                marker: Some(marker),
                indent: visual_indent,
                length,
            };
            in_fence = true;
        }
    } else if matches!(state.phase, FencePhase::InsideFence)
        && visual_indent <= 3 // CommonMark: closing fence can have 0-3 spaces of indentation
        && is_closing_fence(after_indent)
    {
        // Closer must use the same marker and be at least as long as the opener
        if let Some((marker, closer_len)) = detect_fence_marker_with_length(after_indent)
            && Some(marker) == state.marker
            && closer_len >= state.length
        {
            next_state = FenceState::default();
            in_fence = true;
        }
    }

    LineParseOutcome {
        next_state,
        in_fence,
    }
}

/// A complete fenced region found by [`FenceScanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceMatch<'a> {
    /// Byte range of the whole fence, from the opener's first byte
    /// (indentation included) to the end of the closing delimiter line
    /// (line terminator excluded).
    pub range: Range<usize>,
    /// The whole fence text, delimiters and info string included.
    pub text: &'a str,
    /// Fence marker character.
    pub marker: char,
    /// Length of the opening delimiter run.
    pub run_length: usize,
    /// Info string following the opening delimiter, trimmed.
    pub info: &'a str,
    /// Raw text between the opener and closer lines.
    pub body: &'a str,
    /// 1-indexed line of the opening delimiter.
    pub line: usize,
}

impl FenceMatch<'_> {
    /// The opening delimiter run (e.g. "```" or "~~~~").
    pub fn delimiter(&self) -> String {
        std::iter::repeat_n(self.marker, self.run_length).collect()
    }
}

/// An opening delimiter that never found its closer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclosedFence {
    /// 1-indexed line of the opener.
    pub line: usize,
    /// Fence marker character.
    pub marker: char,
    /// The opener line, for diagnostics.
    pub context: String,
}

/// Scans a document for fenced code blocks.
///
/// Fences are matched by marker character and run length: a closer must use
/// the opener's marker with a run at least as long. An opener without a closer
/// is recorded and scanning resumes on the line after it, so fence-like lines
/// inside it can still start blocks of their own.
///
/// Each such miss is remembered per marker: a later opener that could only be
/// closed by a line the failed search already passed over is reported as
/// unclosed without walking to the end again.
pub struct FenceScanner<'a> {
    input: &'a str,
    cursor: usize,
    line: usize,
    unclosed: Vec<UnclosedFence>,
    no_backtick_closer: Option<NoCloser>,
    no_tilde_closer: Option<NoCloser>,
    #[cfg(test)]
    lines_scanned: usize,
}

/// From byte `from` to the end of input, no closer of a marker has a run of
/// `min_length` or more.
#[derive(Debug, Clone, Copy)]
struct NoCloser {
    from: usize,
    min_length: usize,
}

struct OpenFence {
    start: usize,
    body_start: usize,
    line: usize,
    resume_line: usize,
    info_range: Range<usize>,
}

impl<'a> FenceScanner<'a> {
    /// Create a scanner over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: 0,
            line: 1,
            unclosed: Vec::new(),
            no_backtick_closer: None,
            no_tilde_closer: None,
            #[cfg(test)]
            lines_scanned: 0,
        }
    }

    /// Openers without closers seen so far.
    pub fn unclosed(&self) -> &[UnclosedFence] {
        &self.unclosed
    }

    /// Take the recorded unclosed openers.
    pub fn take_unclosed(&mut self) -> Vec<UnclosedFence> {
        std::mem::take(&mut self.unclosed)
    }

    /// Returns (content_end, next_line_start) for the line starting at `start`.
    fn line_bounds(&self, start: usize) -> (usize, usize) {
        match self.input[start..].find('\n') {
            Some(rel) => (start + rel, start + rel + 1),
            None => (self.input.len(), self.input.len()),
        }
    }

    fn line_text(&self, start: usize, end: usize) -> &'a str {
        let text = &self.input[start..end];
        text.strip_suffix('\r').unwrap_or(text)
    }

    fn no_closer(&mut self, marker: char) -> &mut Option<NoCloser> {
        if marker == '~' {
            &mut self.no_tilde_closer
        } else {
            &mut self.no_backtick_closer
        }
    }

    /// Records that nothing after `from` closes a `marker` run of `length`.
    fn remember_no_closer(&mut self, marker: char, from: usize, length: usize) {
        let slot = self.no_closer(marker);
        *slot = Some(match *slot {
            Some(known) => NoCloser {
                from: known.from.max(from),
                min_length: known.min_length.min(length),
            },
            None => NoCloser {
                from,
                min_length: length,
            },
        });
    }

    /// True when an opener whose body starts at `body_start` cannot close.
    fn known_unclosed(&self, marker: char, body_start: usize, length: usize) -> bool {
        let known = if marker == '~' {
            self.no_tilde_closer
        } else {
            self.no_backtick_closer
        };
        known.is_some_and(|known| body_start >= known.from && length >= known.min_length)
    }
}

impl<'a> Iterator for FenceScanner<'a> {
    type Item = FenceMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = FenceState::default();
        let mut open: Option<OpenFence> = None;

        loop {
            if self.cursor >= self.input.len() {
                // Reached the end with an opener pending: report it and rescan
                // from the line after it.
                let pending = open.take()?;
                let marker = state.marker.unwrap_or('`');
                let (opener_end, _) = self.line_bounds(pending.start);
                let context = self.line_text(pending.start, opener_end).to_string();
                self.unclosed.push(UnclosedFence {
                    line: pending.line,
                    marker,
                    context,
                });
                self.remember_no_closer(marker, pending.body_start, state.length);
                self.cursor = pending.body_start;
                self.line = pending.resume_line;
                state = FenceState::default();
                continue;
            }

            let start = self.cursor;
            let (end, next) = self.line_bounds(start);
            let text = self.line_text(start, end);
            let outcome = advance_fence_state(text, state);
            let was_inside = matches!(state.phase, FencePhase::InsideFence);
            let now_inside = matches!(outcome.next_state.phase, FencePhase::InsideFence);
            #[cfg(test)]
            {
                self.lines_scanned += 1;
            }

            if !was_inside
                && now_inside
                && let Some(marker) = outcome.next_state.marker
                && self.known_unclosed(marker, next, outcome.next_state.length)
            {
                self.unclosed.push(UnclosedFence {
                    line: self.line,
                    marker,
                    context: text.to_string(),
                });
                self.cursor = next;
                self.line += 1;
                continue;
            } else if !was_inside && now_inside {
                let (_, indent_bytes) = leading_whitespace_info(text);
                let info_start = start + indent_bytes + outcome.next_state.length;
                open = Some(OpenFence {
                    start,
                    body_start: next,
                    line: self.line,
                    resume_line: self.line + 1,
                    info_range: info_start..start + text.len(),
                });
            } else if was_inside
                && !now_inside
                && let Some(pending) = open.take()
            {
                let marker = state.marker.unwrap_or('`');
                let body = if start > pending.body_start {
                    // Drop the line break that precedes the closer.
                    let body_end = start - 1;
                    let body_end = if self.input[..body_end].ends_with('\r') {
                        body_end - 1
                    } else {
                        body_end
                    };
                    &self.input[pending.body_start..body_end.max(pending.body_start)]
                } else {
                    ""
                };
                let info = self.input[pending.info_range.clone()].trim();
                let range = pending.start..start + text.len();

                self.cursor = next;
                self.line += 1;

                return Some(FenceMatch {
                    text: &self.input[range.clone()],
                    range,
                    marker,
                    run_length: state.length,
                    info,
                    body,
                    line: pending.line,
                });
            }

            state = outcome.next_state;
            self.cursor = next;
            self.line += 1;
        }
    }
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
/// Visual columns expand tabs to 4-column boundaries per CommonMark.
fn leading_whitespace_info(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                col += 1;
                bytes += 1;
            }
            b'\t' => {
                col += 4 - (col % 4); // Tab expands to next 4-column boundary
                bytes += 1;
            }
            _ => break,
        }
    }
    (col, bytes)
}

fn detect_fence_marker_with_length(after_indent: &str) -> Option<(char, usize)> {
    let mut chars = after_indent.chars();
    let first = chars.next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = 1 + chars.take_while(|c| *c == first).count();
    if run_len >= 3 {
        Some((first, run_len))
    } else {
        None
    }
}

/// Backtick fences cannot carry backticks in their info string (CommonMark).
fn is_valid_info(marker: char, info: &str) -> bool {
    marker != '`' || !info.contains('`')
}

/// Check if a line is a closing fence (no info string after markers).
/// A closing fence has only fence markers followed by optional whitespace.
fn is_closing_fence(after_indent: &str) -> bool {
    let mut chars = after_indent.chars();
    let first = match chars.next() {
        Some(c) if c == '`' || c == '~' => c,
        _ => return false,
    };
    let mut count = 1;
    for c in chars.by_ref() {
        if c == first {
            count += 1;
        } else {
            // After markers, only whitespace is allowed for a closing fence
            return count >= 3 && c.is_whitespace() && chars.all(|c| c.is_whitespace());
        }
    }
    count >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<FenceMatch<'_>> {
        FenceScanner::new(input).collect()
    }

    #[test]
    fn opens_and_closes_backtick_fence() {
        let start = advance_fence_state("```js", FenceState::default());
        assert!(start.in_fence);
        assert!(matches!(start.next_state.phase, FencePhase::InsideFence));
        assert_eq!(start.next_state.marker, Some('`'));
        assert_eq!(start.next_state.indent, 0);

        let inner = advance_fence_state("console.log('hi');", start.next_state);
        assert!(inner.in_fence);
        assert!(matches!(inner.next_state.phase, FencePhase::InsideFence));

        let end = advance_fence_state("```", inner.next_state);
        assert!(end.in_fence);
        assert!(matches!(end.next_state.phase, FencePhase::Outside));
        assert_eq!(end.next_state.marker, None);
    }

    #[test]
    fn deeply_indented_fence_not_opened() {
        let outcome = advance_fence_state("    ```js", FenceState::default());
        assert!(!outcome.in_fence);

        let tabbed = advance_fence_state("\t```js", FenceState::default());
        assert!(!tabbed.in_fence);
    }

    #[test]
    fn backtick_in_info_string_is_not_an_opener() {
        let outcome = advance_fence_state("``` js`", FenceState::default());
        assert!(!outcome.in_fence);

        let tilde = advance_fence_state("~~~ a`b", FenceState::default());
        assert!(tilde.in_fence);
    }

    #[test]
    fn ignores_mismatched_marker() {
        let start = advance_fence_state("~~~ts", FenceState::default());
        let still_inside = advance_fence_state("```", start.next_state);
        assert!(matches!(
            still_inside.next_state.phase,
            FencePhase::InsideFence
        ));
        assert_eq!(still_inside.next_state.marker, Some('~'));
    }

    #[test]
    fn scans_single_block() {
        let input = "Intro\n\n```js\nconst x = 1;\n```\n\nOutro";
        let matches = scan(input);
        assert_eq!(matches.len(), 1);

        let m = &matches[0];
        assert_eq!(m.text, "```js\nconst x = 1;\n```");
        assert_eq!(m.info, "js");
        assert_eq!(m.body, "const x = 1;");
        assert_eq!(m.marker, '`');
        assert_eq!(m.run_length, 3);
        assert_eq!(m.line, 3);
        assert_eq!(&input[m.range.clone()], m.text);
    }

    #[test]
    fn scans_empty_body() {
        let matches = scan("```\n```");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].body, "");
        assert_eq!(matches[0].info, "");
    }

    #[test]
    fn longer_outer_fence_contains_inner_fence() {
        let input = "````markdown\n```js\nlet a;\n```\n````\n";
        let matches = scan(input);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].body, "```js\nlet a;\n```");
        assert_eq!(matches[0].delimiter(), "````");
    }

    #[test]
    fn tilde_fence_with_indented_closer() {
        let input = "  ~~~ rust {data-filename=\"a.rs\"}\nfn main() {}\n   ~~~~\n";
        let matches = scan(input);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].info, "rust {data-filename=\"a.rs\"}");
        assert_eq!(matches[0].text, input.trim_end_matches('\n'));
    }

    #[test]
    fn reports_unclosed_and_rescans_after_opener() {
        let input = "```js\nlet a;\n~~~\ninner\n~~~\n";
        let mut scanner = FenceScanner::new(input);
        let matches: Vec<_> = scanner.by_ref().collect();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].marker, '~');
        assert_eq!(matches[0].body, "inner");
        assert_eq!(matches[0].line, 3);

        let unclosed = scanner.take_unclosed();
        assert_eq!(unclosed.len(), 1);
        assert_eq!(unclosed[0].line, 1);
        assert_eq!(unclosed[0].context, "```js");
    }

    #[test]
    fn repeated_unclosed_openers_scan_linearly() {
        let input = "```js\n".repeat(2000);
        let mut scanner = FenceScanner::new(&input);
        assert_eq!(scanner.by_ref().count(), 0);
        assert_eq!(scanner.unclosed().len(), 2000);
        assert_eq!(scanner.unclosed()[1999].line, 2000);
        assert!(scanner.lines_scanned < 3 * 2000, "{}", scanner.lines_scanned);
    }

    #[test]
    fn shorter_fence_after_unclosed_longer_one_still_closes() {
        let input = "````\n```js\nbody\n```\n";
        let mut scanner = FenceScanner::new(input);
        let matches: Vec<_> = scanner.by_ref().collect();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].body, "body");
        assert_eq!(matches[0].line, 2);
        assert_eq!(scanner.unclosed().len(), 1);
        assert_eq!(scanner.unclosed()[0].context, "````");
    }

    #[test]
    fn two_blocks_in_document_order() {
        let input = "```\na very long line of code here\n```\n\n~~~\nb\n~~~";
        let matches = scan(input);
        assert_eq!(matches.len(), 2);
        assert!(matches[0].range.end <= matches[1].range.start);
        assert_eq!(matches[1].body, "b");
        assert_eq!(matches[1].line, 5);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let input = "```js\r\nlet a;\r\n```\r\n";
        let matches = scan(input);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].info, "js");
        assert_eq!(matches[0].body, "let a;");
    }
}
