//! Shared helper: a real compiler front-end's AST never contains nodes for
//! an untaken preprocessor branch at all (the preprocessor strips them
//! before the parser runs). `tree-sitter-cpp` has no preprocessor and
//! parses every branch structurally, so the collector and optimizer visitor
//! both need to recognize and skip declarations that fall inside one of
//! `core_frontend::scan_inactive_blocks`' reported ranges. Their fate is
//! owned entirely by [`crate::remove_inactive_blocks`], not by
//! reachability-based deletion.

use core_model::{InactivePreprocBlock, SourceRange};

pub(crate) fn is_inside_any(range: &SourceRange, blocks: &[InactivePreprocBlock]) -> bool {
    blocks.iter().any(|b| b.range.contains(range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_inside_a_reported_block_is_detected() {
        let blocks = vec![InactivePreprocBlock {
            range: SourceRange::new(0, 100),
            referenced_macros: Default::default(),
        }];
        assert!(is_inside_any(&SourceRange::new(10, 20), &blocks));
        assert!(!is_inside_any(&SourceRange::new(200, 210), &blocks));
    }
}
