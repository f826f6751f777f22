//! Comma-group variable pruner (§4.5). Runs after the optimizer visitor.

use core_model::{DeclArena, SourceInfo, SourceRange, UsageInfo};
use core_rewrite::{RemoveOpts, SmartRewriter};

/// Prune unused declarators out of each comma-grouped variable declaration
/// (`int a, b, c;`), leaving a well-formed statement behind regardless of
/// which subset survives.
pub fn prune_comma_groups(arena: &DeclArena, info: &SourceInfo, usage: &UsageInfo, rewriter: &mut SmartRewriter) {
    for (&group_start, members) in &info.static_variables {
        let n = members.len();
        let is_used: Vec<bool> = members
            .iter()
            .map(|&id| usage.is_used(arena.canonicalize(id)))
            .collect();
        let last_used = is_used.iter().rposition(|&u| u).unwrap_or(n);

        if last_used == n {
            // Nothing in the group survived: remove the whole statement,
            // from the shared type start through to the terminating `;`.
            let group_end = arena
                .get(members[0])
                .comma_group_end
                .expect("comma-group member always carries the group's end");
            rewriter.remove_range(SourceRange::new(group_start, group_end), RemoveOpts::remove_empty_lines());
            continue;
        }

        for (i, &id) in members.iter().enumerate() {
            if i >= last_used {
                break;
            }
            if is_used[i] {
                continue;
            }
            let decl = arena.get(id);
            // Extend through the following comma, if one follows, so the
            // remaining declarator list stays well-formed.
            let end = next_comma_end(arena, members, i).unwrap_or(decl.range.end);
            rewriter.remove_range(SourceRange::new(decl.range.start, end), RemoveOpts::remove_empty_lines());
        }

        if last_used + 1 < n {
            // Trailing unused declarators after the last used one: remove
            // from the comma following it through to the group's end.
            let last = arena.get(members[last_used]);
            let tail_end = arena.get(members[n - 1]).range.end;
            if last.range.end < tail_end {
                rewriter.remove_range(SourceRange::new(last.range.end, tail_end), RemoveOpts::remove_empty_lines());
            }
        }
    }
}

/// The end offset of the comma immediately following declarator `i`, found
/// as the gap between this declarator's end and the next one's start.
fn next_comma_end(arena: &DeclArena, members: &[core_model::DeclId], i: usize) -> Option<u32> {
    members.get(i + 1).map(|&next| arena.get(next).range.start)
}
