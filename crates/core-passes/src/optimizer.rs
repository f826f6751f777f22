//! Optimizer visitor (§4.4): the second traversal, deciding per-declaration
//! deletion and submitting ranges to the shared [`SmartRewriter`].
//!
//! Does not visit implicit code, template instantiations, or declarations
//! inside an inactive preprocessor branch. This front end never produces
//! implicit/instantiated nodes, and inactive-branch declarations are the
//! sole responsibility of [`crate::remove_inactive_blocks`] (see
//! `crate::inactive`), so every other `Decl` it hands back is in scope.

use std::collections::HashSet;

use core_model::{Decl, DeclArena, DeclId, DeclKind, InactivePreprocBlock, SourceRange, SpecialMemberState, UsageInfo};
use core_rewrite::{RemoveOpts, SmartRewriter};

/// Run the optimizer visitor over every declaration, deleting the ones the
/// deletion table (§4.4) marks for removal.
pub fn optimize(arena: &DeclArena, usage: &UsageInfo, inactive_blocks: &[InactivePreprocBlock], rewriter: &mut SmartRewriter) {
    let mut declared: HashSet<DeclId> = HashSet::new();
    let mut using_targets_seen: HashSet<String> = HashSet::new();

    for decl in arena.iter() {
        if !decl.in_main_file || crate::inactive::is_inside_any(&decl.range, inactive_blocks) {
            continue;
        }

        let canon = arena.canonicalize(decl.id);
        let should_delete = decide(decl, canon, usage, &declared, &mut using_targets_seen);

        if matches!(
            decl.kind,
            DeclKind::Function | DeclKind::FunctionTemplate | DeclKind::ClassRecord | DeclKind::ClassTemplate
        ) {
            declared.insert(canon);
        }

        if should_delete {
            remove(decl, rewriter);
        }
    }
}

fn decide(
    decl: &Decl,
    canon: DeclId,
    usage: &UsageInfo,
    declared: &HashSet<DeclId>,
    using_targets_seen: &mut HashSet<String>,
) -> bool {
    match decl.kind {
        DeclKind::Empty => true,

        DeclKind::Namespace => !usage.is_used(decl.id),

        DeclKind::Function => {
            if decl.special_member != SpecialMemberState::Ordinary {
                return false;
            }
            !usage.is_used(canon) || (!decl.is_definition && declared.contains(&canon))
        }

        // `templated_decl` is never populated by this front end (it always
        // collapses a `template_declaration` into one combined `Decl`), so
        // the "templated function already handled inline" exception never
        // applies and a function template follows the same rule as a plain
        // function.
        DeclKind::FunctionTemplate => !usage.is_used(canon) || (!decl.is_definition && declared.contains(&canon)),

        DeclKind::ClassRecord => !usage.is_used(canon) || (!decl.is_definition && declared.contains(&canon)),

        DeclKind::ClassTemplate => !usage.is_used(canon) || (!decl.is_definition && declared.contains(&canon)),

        // `described_template` is never populated here either, so the
        // "handled via the template node" exception never applies.
        DeclKind::Typedef | DeclKind::TypeAlias | DeclKind::AliasTemplate => !usage.is_used(canon),

        DeclKind::UsingDirective => {
            let target = decl.using_directive_target.clone().unwrap_or_default();
            !using_targets_seen.insert(target)
        }

        DeclKind::Variable | DeclKind::Field | DeclKind::Lambda => false,
    }
}

fn remove(decl: &Decl, rewriter: &mut SmartRewriter) {
    if !rewriter.remove_range(decl.range, RemoveOpts::remove_empty_lines()) {
        tracing::trace!(target: "core_passes", decl = %decl.name, "deletion range already claimed, skipping");
        return;
    }
    if let Some(comment_range) = decl.comment_range {
        if !rewriter.remove_range(comment_range, RemoveOpts::remove_empty_lines()) {
            tracing::trace!(target: "core_passes", decl = %decl.name, "comment range already claimed, skipping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::DeclId;

    fn blank(id: u32, kind: DeclKind, name: &str, start: u32, end: u32) -> Decl {
        Decl {
            id: DeclId(id),
            kind,
            name: name.to_string(),
            range: SourceRange::new(start, end),
            comment_range: None,
            raw_comment_text: None,
            in_main_file: true,
            canonical: DeclId(id),
            is_definition: true,
            is_main: false,
            is_virtual: false,
            special_member: SpecialMemberState::Ordinary,
            lexical_parent: None,
            destructor: None,
            instantiated_from: None,
            described_template: None,
            templated_decl: None,
            using_directive_target: None,
            namespace_reopen_ordinal: None,
            comma_group_start: None,
            comma_group_end: None,
            declared_type_name: None,
        }
    }

    #[test]
    fn unused_function_is_removed() {
        let mut arena = DeclArena::new();
        let id = arena.insert(blank(0, DeclKind::Function, "unused", 0, 20));
        let usage = UsageInfo::new();
        let mut rewriter = SmartRewriter::new(&"x".repeat(20));
        optimize(&arena, &usage, &[], &mut rewriter);
        rewriter.apply_changes();
        assert_eq!(rewriter.rewritten_source(), "");
        let _ = id;
    }

    #[test]
    fn used_function_is_kept() {
        let mut arena = DeclArena::new();
        let id = arena.insert(blank(0, DeclKind::Function, "f", 0, 10));
        let mut usage = UsageInfo::new();
        usage.mark(id);
        let source = "x".repeat(10);
        let mut rewriter = SmartRewriter::new(&source);
        optimize(&arena, &usage, &[], &mut rewriter);
        rewriter.apply_changes();
        assert_eq!(rewriter.rewritten_source(), source);
    }

    #[test]
    fn deleted_special_member_is_never_removed_even_if_unused() {
        let mut arena = DeclArena::new();
        let mut decl = blank(0, DeclKind::Function, "op", 0, 10);
        decl.special_member = SpecialMemberState::Deleted;
        arena.insert(decl);
        let usage = UsageInfo::new();
        let source = "x".repeat(10);
        let mut rewriter = SmartRewriter::new(&source);
        optimize(&arena, &usage, &[], &mut rewriter);
        rewriter.apply_changes();
        assert_eq!(rewriter.rewritten_source(), source);
    }

    #[test]
    fn second_using_directive_for_same_namespace_is_pruned() {
        let mut arena = DeclArena::new();
        let mut first = blank(0, DeclKind::UsingDirective, "std", 0, 20);
        first.using_directive_target = Some("std".to_string());
        arena.insert(first);
        let mut second = blank(1, DeclKind::UsingDirective, "std", 20, 40);
        second.using_directive_target = Some("std".to_string());
        arena.insert(second);

        let usage = UsageInfo::new();
        let source = "x".repeat(40);
        let mut rewriter = SmartRewriter::new(&source);
        optimize(&arena, &usage, &[], &mut rewriter);
        rewriter.apply_changes();
        assert_eq!(rewriter.rewritten_source(), "x".repeat(20));
    }

    #[test]
    fn forward_declaration_of_already_declared_function_is_removed() {
        let mut arena = DeclArena::new();
        let canon_id = DeclId(0);
        let mut canon = blank(0, DeclKind::Function, "f", 0, 10);
        canon.is_definition = true;
        arena.insert(canon);
        let mut redecl = blank(1, DeclKind::Function, "f", 10, 20);
        redecl.is_definition = false;
        redecl.canonical = canon_id;
        arena.insert(redecl);

        let mut usage = UsageInfo::new();
        usage.mark(canon_id);
        let source = "x".repeat(20);
        let mut rewriter = SmartRewriter::new(&source);
        optimize(&arena, &usage, &[], &mut rewriter);
        rewriter.apply_changes();
        assert_eq!(rewriter.rewritten_source(), "x".repeat(10));
    }
}
