//! Inactive preprocessor block remover (§4.7).

use std::collections::HashSet;

use core_model::InactivePreprocBlock;
use core_rewrite::{RemoveOpts, SmartRewriter};

/// Remove every inactive conditional-compilation branch whose referenced
/// macros are disjoint from `macros_to_keep`, so configuration points the
/// caller cares about survive even while inactive.
pub fn remove_inactive_blocks(
    blocks: &[InactivePreprocBlock],
    macros_to_keep: &HashSet<String>,
    rewriter: &mut SmartRewriter,
) {
    for block in blocks {
        if !block.referenced_macros.is_disjoint(macros_to_keep) {
            tracing::trace!(
                target: "core_passes",
                referenced = ?block.referenced_macros,
                "skipping inactive block, references a kept macro"
            );
            continue;
        }
        rewriter.remove_range(block.range, RemoveOpts::remove_empty_lines());
    }
}
