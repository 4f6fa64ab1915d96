//! Line-level diff markup for code blocks.
//!
//! Directives are written `+N` (inserted line) or `-N` (deleted line), with
//! `N` 1-indexed against the normalized block. Directives are applied in
//! order; a later directive on the same line replaces the earlier markup.
//! Directives outside the block are skipped and returned to the caller.

use std::fmt;

/// Whether a line was inserted or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// `+N`
    Insertion,
    /// `-N`
    Deletion,
}

impl DiffKind {
    fn operator(self) -> char {
        match self {
            DiffKind::Insertion => '+',
            DiffKind::Deletion => '-',
        }
    }

    fn class(self) -> &'static str {
        match self {
            DiffKind::Insertion => "diff-insertion",
            DiffKind::Deletion => "diff-deletion",
        }
    }
}

/// A single `+N` / `-N` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffDirective {
    /// Insertion or deletion.
    pub kind: DiffKind,
    /// 1-indexed target line.
    pub line: usize,
}

impl DiffDirective {
    /// Parses `+N` or `-N`. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (kind, digits) = if let Some(rest) = raw.strip_prefix('+') {
            (DiffKind::Insertion, rest)
        } else if let Some(rest) = raw.strip_prefix('-') {
            (DiffKind::Deletion, rest)
        } else {
            return None;
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let line = digits.parse().ok()?;
        Some(Self { kind, line })
    }
}

impl fmt::Display for DiffDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.operator(), self.line)
    }
}

/// Parses a comma- or space-separated directive list, skipping malformed entries.
pub fn parse_directives(list: &str) -> Vec<DiffDirective> {
    list.split([',', ' '])
        .filter(|piece| !piece.trim().is_empty())
        .filter_map(|piece| {
            let parsed = DiffDirective::parse(piece);
            if parsed.is_none() {
                log::debug!("Ignoring malformed diff directive '{}'", piece);
            }
            parsed
        })
        .collect()
}

/// Wraps the lines targeted by `directives` in insertion/deletion markup.
///
/// `lines` is modified in place. Returns the directives that pointed outside
/// `1..=lines.len()`; those are not applied.
pub fn annotate(lines: &mut [String], directives: &[DiffDirective]) -> Vec<DiffDirective> {
    let mut skipped = Vec::new();
    if directives.is_empty() {
        return skipped;
    }

    // Markup wraps the original text, so repeated directives replace each other.
    let originals: Vec<String> = lines.to_vec();
    for directive in directives {
        let Some(index) = directive.line.checked_sub(1).filter(|i| *i < lines.len()) else {
            skipped.push(*directive);
            continue;
        };
        lines[index] = format!(
            r#"<span class="{}"><span class="diff-operator">{}</span>{}</span>"#,
            directive.kind.class(),
            directive.kind.operator(),
            originals[index]
        );
    }
    skipped
}

/// Convenience wrapper over [`annotate`] for newline-joined text.
pub fn annotate_text(code: &str, directives: &[DiffDirective]) -> String {
    if directives.is_empty() {
        return code.to_string();
    }
    let mut lines: Vec<String> = code.split('\n').map(str::to_string).collect();
    annotate(&mut lines, directives);
    lines.join("\n")
}
