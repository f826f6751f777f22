//! SmartRewriter: a deduplicating, buffered text-edit layer over the original
//! source (§4.6).
//!
//! Both the optimizer visitor and the inactive-preprocessor-block remover
//! submit `remove_range` requests against the *same* `SmartRewriter`
//! instance; the non-overlap check is what lets their two edit streams
//! deconflict without either one knowing about the other.

use core_model::SourceRange;
use ropey::Rope;

/// Options accompanying a single `remove_range` request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOpts {
    /// When set, a later `apply_changes` pass may collapse runs of blank
    /// lines left behind by this deletion (§4.4 "Removal protocol").
    pub remove_empty_lines: bool,
}

impl RemoveOpts {
    pub fn remove_empty_lines() -> Self {
        Self {
            remove_empty_lines: true,
        }
    }
}

/// A buffered text-edit layer. See module docs and §4.6.
pub struct SmartRewriter {
    rope: Rope,
    accepted: Vec<(SourceRange, RemoveOpts)>,
    applied: bool,
}

impl SmartRewriter {
    pub fn new(source: &str) -> Self {
        Self {
            rope: Rope::from_str(source),
            accepted: Vec::new(),
            applied: false,
        }
    }

    /// True iff no previously accepted range overlaps `range`.
    pub fn can_remove_range(&self, range: &SourceRange) -> bool {
        self.accepted.iter().all(|(r, _)| !r.overlaps(range))
    }

    /// Attempt to accept a removal. Returns whether it was accepted; a
    /// rejected request is a silent no-op, matching "if not, no-op" in §4.6.
    pub fn remove_range(&mut self, range: SourceRange, opts: RemoveOpts) -> bool {
        if range.is_empty() {
            return true;
        }
        if !self.can_remove_range(&range) {
            tracing::trace!(
                target: "core_rewrite",
                start = range.start,
                end = range.end,
                "remove_range rejected: overlaps an already-accepted range"
            );
            return false;
        }
        tracing::trace!(target: "core_rewrite", start = range.start, end = range.end, "remove_range accepted");
        self.accepted.push((range, opts));
        true
    }

    pub fn accepted_range_count(&self) -> usize {
        self.accepted.len()
    }

    /// Apply every accepted deletion. Idempotent: calling this more than once
    /// is a no-op after the first call (§4.6 invariant).
    pub fn apply_changes(&mut self) {
        if self.applied {
            return;
        }
        self.applied = true;

        // Deterministic regardless of acceptance order: sort by (start, end),
        // then delete back-to-front so earlier, not-yet-processed ranges keep
        // valid byte offsets (§9 "Edit-order independence").
        let mut ranges = self.accepted.clone();
        ranges.sort_by(|(a, _), (b, _)| a.cmp(b));

        let collapse_blank_lines = ranges.iter().any(|(_, opts)| opts.remove_empty_lines);

        for (range, _) in ranges.into_iter().rev() {
            let char_start = self.rope.byte_to_char(range.start as usize);
            let char_end = self.rope.byte_to_char(range.end as usize);
            self.rope.remove(char_start..char_end);
        }

        if collapse_blank_lines {
            let collapsed = collapse_blank_lines_text(&self.rope.to_string());
            self.rope = Rope::from_str(&collapsed);
        }
    }

    /// The edited buffer, or the original source if nothing was ever
    /// accepted (§4.6 `getRewriteBufferFor`).
    pub fn rewritten_source(&self) -> String {
        self.rope.to_string()
    }
}

/// Collapse runs of two or more consecutive blank (whitespace-only) lines
/// down to a single blank line. This is the only formatting the engine does
/// (§2 item 8: "output... with empty-line collapsing only"); it is applied as
/// a global post-pass rather than per-deletion range expansion so that
/// adjacent accepted deletions never fight over the same whitespace bytes.
fn collapse_blank_lines_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n');
        if trimmed.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
    }
    out
}
