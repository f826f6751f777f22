//! Dependencies collector (§4.1).
//!
//! A full Clang-based collector walks implicit code, template
//! instantiations, and type locations directly against the compiler's own
//! AST. This front end only exposes declaration shape, so uses-edges here
//! are recovered two ways: structurally (lexical nesting, declared-type
//! spelling) straight from [`core_model::Decl`], and textually, by
//! re-walking the syntax tree inside each function body and resolving bare
//! identifiers/call targets/member accesses by name against the set of
//! known declarations. Name-based resolution is the same structural
//! approximation the rest of `core-frontend` makes: it cannot disambiguate
//! overloads, but it errs toward *more* edges, which errs toward *keeping*
//! code, matching §4.1's stated failure semantics.

use std::collections::HashMap;

use core_model::{DeclArena, DeclId, DeclKind, SourceInfo, TranslationUnit};
use tree_sitter::{Node, Parser};

/// Build `SourceInfo` for `tu` (§3, §4.1).
pub fn collect(tu: &TranslationUnit) -> SourceInfo {
    let arena = &tu.decls;
    let mut info = SourceInfo::new();

    let by_name = index_by_name(arena, &tu.inactive_blocks);

    for decl in arena.iter() {
        if crate::inactive::is_inside_any(&decl.range, &tu.inactive_blocks) {
            // Never compiled by a real front end; its fate belongs entirely
            // to the inactive-preprocessor-block remover.
            continue;
        }
        let canon = arena.canonicalize(decl.id);

        if decl.is_main {
            info.add_root(canon);
        }
        if decl
            .raw_comment_text
            .as_deref()
            .is_some_and(|c| c.contains("caide keep"))
        {
            info.add_root(canon);
        }

        // Any declaration gets an edge to its enclosing non-function context
        // (class or namespace), so members keep their container alive.
        if let Some(parent) = decl.lexical_parent {
            info.add_use(canon, arena.canonicalize(parent));
        }

        // Virtual calls are invisible as textual references; a live class
        // must retain its vtable members, so the edge runs the other way.
        if decl.kind == DeclKind::Function && decl.is_virtual {
            if let Some(class) = decl.lexical_parent {
                info.add_use(arena.canonicalize(class), canon);
            }
        }

        // `refType`, name-resolved: a variable/field's declared type keeps
        // that type's declaration alive once the variable itself is used.
        if let Some(type_name) = decl.declared_type_name.as_deref() {
            for target in resolve_type_name(type_name, &by_name) {
                info.add_use(canon, arena.canonicalize(target));
            }
        }

        // Comma-grouped global/static variables feed the pruner (§4.5);
        // singleton (non-grouped) variable declarations are never targeted
        // by the optimizer visitor's deletion table at all (it has no
        // `Variable` row), so this repository conservatively treats them as
        // roots rather than silently never-removable dead weight, see
        // DESIGN.md's note on scenario 3.
        if decl.kind == DeclKind::Variable {
            match decl.comma_group_start {
                Some(start) => info.add_static_variable(start, decl.id),
                None => info.add_root(canon),
            }
        }

        // `tree-sitter` parses eagerly; there is no deferred template body to
        // force-parse later (§4.2), so `delayed_parsed_functions` stays empty
        // for this front end.
    }

    collect_body_references(tu, &by_name, &mut info);

    tracing::debug!(
        target: "core_passes",
        uses_edges = info.uses.values().map(|s| s.len()).sum::<usize>(),
        roots = info.decls_to_keep.len(),
        "collected SourceInfo"
    );

    info
}

fn index_by_name(arena: &DeclArena, inactive_blocks: &[core_model::InactivePreprocBlock]) -> HashMap<String, Vec<DeclId>> {
    let mut by_name: HashMap<String, Vec<DeclId>> = HashMap::new();
    for decl in arena.iter() {
        if crate::inactive::is_inside_any(&decl.range, inactive_blocks) {
            continue;
        }
        by_name.entry(decl.name.clone()).or_default().push(decl.id);
    }
    by_name
}

/// Strip `const`/pointer/reference/array decoration and template arguments
/// down to a bare type name, then resolve it against known declarations.
fn resolve_type_name<'a>(type_name: &str, by_name: &'a HashMap<String, Vec<DeclId>>) -> Vec<DeclId> {
    let base = type_name
        .trim()
        .trim_start_matches("const ")
        .trim_start_matches("struct ")
        .trim_start_matches("class ")
        .split(['<', '*', '&', '[']) // drop template args / decoration
        .next()
        .unwrap_or("")
        .trim();
    by_name.get(base).cloned().unwrap_or_default()
}

/// Re-walk the syntax tree to pick up uses that only appear inside function
/// bodies: calls, member accesses, and bare identifier references. Global
/// variable initializers are intentionally not walked (§9 "Global-initializer
/// side effects", the engine does not attempt purity analysis there).
fn collect_body_references(tu: &TranslationUnit, by_name: &HashMap<String, Vec<DeclId>>, info: &mut SourceInfo) {
    let arena = &tu.decls;
    let mut fn_starts: HashMap<u32, DeclId> = HashMap::new();
    for decl in arena.iter() {
        if decl.kind == DeclKind::Function
            && decl.is_definition
            && !crate::inactive::is_inside_any(&decl.range, &tu.inactive_blocks)
        {
            fn_starts.insert(decl.range.start, decl.id);
        }
    }
    if fn_starts.is_empty() {
        return;
    }

    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_cpp::LANGUAGE.into()).is_err() {
        return;
    }
    let Some(tree) = parser.parse(&tu.source, None) else {
        return;
    };

    walk(&tree.root_node(), tu, arena, &fn_starts, by_name, info, None);
}

fn walk(
    node: &Node,
    tu: &TranslationUnit,
    arena: &DeclArena,
    fn_starts: &HashMap<u32, DeclId>,
    by_name: &HashMap<String, Vec<DeclId>>,
    info: &mut SourceInfo,
    current: Option<DeclId>,
) {
    let mut next_current = current;
    if node.kind() == "function_definition" {
        if let Some(&id) = fn_starts.get(&(node.start_byte() as u32)) {
            next_current = Some(arena.canonicalize(id));
        }
    }

    if let Some(from) = next_current {
        if matches!(node.kind(), "identifier" | "field_identifier" | "type_identifier") {
            let name = &tu.source[node.byte_range()];
            if let Some(candidates) = by_name.get(name) {
                for &to in candidates {
                    info.add_use(from, arena.canonicalize(to));
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(&child, tu, arena, fn_starts, by_name, info, next_current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_frontend::{FrontEnd, TreeSitterFrontEnd};
    use std::path::PathBuf;

    fn parse(src: &str) -> TranslationUnit {
        TreeSitterFrontEnd::new()
            .parse(&PathBuf::from("main.cpp"), src.to_string(), &[])
            .expect("parse should succeed")
    }

    #[test]
    fn main_is_a_root() {
        let tu = parse("int unused(){return 1;} int main(){return 0;}");
        let info = collect(&tu);
        let main_id = tu.decls.iter().find(|d| d.name == "main").unwrap().id;
        assert!(info.decls_to_keep.contains(&tu.decls.canonicalize(main_id)));
    }

    #[test]
    fn caide_keep_comment_seeds_a_root() {
        let tu = parse("/// caide keep\nint helper(){return 7;} int main(){return 0;}");
        let info = collect(&tu);
        let helper_id = tu.decls.iter().find(|d| d.name == "helper").unwrap().id;
        assert!(info.decls_to_keep.contains(&tu.decls.canonicalize(helper_id)));
    }

    #[test]
    fn main_body_reference_creates_uses_edge() {
        let tu = parse("int a,b,c; int main(){return b;}");
        let info = collect(&tu);
        let main_id = tu.decls.iter().find(|d| d.name == "main").unwrap().id;
        let b_id = tu
            .decls
            .iter()
            .find(|d| d.name == "b" && d.kind == DeclKind::Variable)
            .unwrap()
            .id;
        assert!(info.uses_of(tu.decls.canonicalize(main_id)).any(|u| u == tu.decls.canonicalize(b_id)));
    }

    #[test]
    fn singleton_global_variable_is_a_root_but_grouped_ones_are_not() {
        let tu = parse("struct A{virtual ~A(){} virtual void f(){}}; A a; int main(){return 0;}");
        let info = collect(&tu);
        let a_var = tu
            .decls
            .iter()
            .find(|d| d.name == "a" && d.kind == DeclKind::Variable)
            .unwrap();
        assert!(info.decls_to_keep.contains(&tu.decls.canonicalize(a_var.id)));

        let grouped = parse("int a,b,c; int main(){return b;}");
        let grouped_info = collect(&grouped);
        let a_in_group = grouped
            .decls
            .iter()
            .find(|d| d.name == "a" && d.kind == DeclKind::Variable)
            .unwrap();
        assert!(!grouped_info.decls_to_keep.contains(&grouped.decls.canonicalize(a_in_group.id)));
    }

    #[test]
    fn virtual_method_gets_reverse_edge_from_its_class() {
        let tu = parse("struct A{virtual ~A(){} virtual void f(){}}; A a; int main(){return 0;}");
        let info = collect(&tu);
        let class = tu
            .decls
            .iter()
            .find(|d| d.kind == DeclKind::ClassRecord)
            .unwrap();
        let f = tu.decls.iter().find(|d| d.name == "f").unwrap();
        assert!(info
            .uses_of(tu.decls.canonicalize(class.id))
            .any(|u| u == tu.decls.canonicalize(f.id)));
    }

    #[test]
    fn variable_declared_type_resolves_to_its_class() {
        let tu = parse("struct A{virtual ~A(){} virtual void f(){}}; A a; int main(){return 0;}");
        let info = collect(&tu);
        let a_var = tu
            .decls
            .iter()
            .find(|d| d.name == "a" && d.kind == DeclKind::Variable)
            .unwrap();
        let class = tu.decls.iter().find(|d| d.kind == DeclKind::ClassRecord).unwrap();
        assert!(info
            .uses_of(tu.decls.canonicalize(a_var.id))
            .any(|u| u == tu.decls.canonicalize(class.id)));
    }
}
