//! Reachability solver (§4.3).

use std::collections::VecDeque;

use core_model::{DeclArena, DeclKind, SourceInfo, UsageInfo};

/// Worklist reachability from `info.decls_to_keep` over `info.uses`.
pub fn solve(arena: &DeclArena, info: &SourceInfo) -> UsageInfo {
    let mut usage = UsageInfo::new();
    let mut worklist: VecDeque<_> = info.decls_to_keep.iter().copied().collect();

    while let Some(id) = worklist.pop_front() {
        if !usage.mark(id) {
            continue;
        }

        let decl = arena.get(id);
        if decl.in_main_file {
            usage.mark_range(decl.range);
        }

        if decl.kind == DeclKind::ClassRecord {
            if let Some(dtor) = decl.destructor {
                worklist.push_back(arena.canonicalize(dtor));
            }
        }

        for next in info.uses_of(id) {
            if !usage.is_used(next) {
                worklist.push_back(next);
            }
        }
    }

    tracing::debug!(target: "core_passes", reached = usage.len(), "reachability solved");
    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{Decl, DeclId, SourceRange, SpecialMemberState};

    fn decl(id: u32, kind: DeclKind, name: &str) -> Decl {
        Decl {
            id: DeclId(id),
            kind,
            name: name.to_string(),
            range: SourceRange::new(id * 10, id * 10 + 5),
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
    fn reachable_via_transitive_uses_is_marked() {
        let mut arena = DeclArena::new();
        let a = arena.insert(decl(0, DeclKind::Function, "a"));
        let b = arena.insert(decl(1, DeclKind::Function, "b"));
        let c = arena.insert(decl(2, DeclKind::Function, "c"));

        let mut info = SourceInfo::new();
        info.add_root(a);
        info.add_use(a, b);
        info.add_use(b, c);

        let usage = solve(&arena, &info);
        assert!(usage.is_used(a));
        assert!(usage.is_used(b));
        assert!(usage.is_used(c));
    }

    #[test]
    fn unreachable_decl_is_not_marked() {
        let mut arena = DeclArena::new();
        let a = arena.insert(decl(0, DeclKind::Function, "a"));
        let orphan = arena.insert(decl(1, DeclKind::Function, "orphan"));

        let mut info = SourceInfo::new();
        info.add_root(a);

        let usage = solve(&arena, &info);
        assert!(usage.is_used(a));
        assert!(!usage.is_used(orphan));
    }

    #[test]
    fn class_record_enqueues_its_destructor() {
        let mut arena = DeclArena::new();
        let dtor = arena.insert(decl(0, DeclKind::Function, "~A"));
        let mut class_decl = decl(1, DeclKind::ClassRecord, "A");
        class_decl.destructor = Some(dtor);
        let class = arena.insert(class_decl);

        let mut info = SourceInfo::new();
        info.add_root(class);

        let usage = solve(&arena, &info);
        assert!(usage.is_used(class));
        assert!(usage.is_used(dtor));
    }

    #[test]
    fn cycles_terminate() {
        let mut arena = DeclArena::new();
        let a = arena.insert(decl(0, DeclKind::Function, "a"));
        let b = arena.insert(decl(1, DeclKind::Function, "b"));

        let mut info = SourceInfo::new();
        info.add_root(a);
        info.add_use(a, b);
        info.add_use(b, a);

        let usage = solve(&arena, &info);
        assert_eq!(usage.len(), 2);
    }
}
