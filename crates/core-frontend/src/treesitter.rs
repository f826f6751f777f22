//! The one concrete [`FrontEnd`] this repository ships: a structural parser
//! built on `tree-sitter`/`tree-sitter-cpp`.
//!
//! This is deliberately *not* a semantic analyzer. It cannot resolve
//! overloads, instantiate templates, or evaluate constant expressions; it
//! only recovers declaration shape and nesting from syntax, which is exactly
//! the boundary §1 draws around "the compiler front-end itself." Template
//! declarations are represented as a single combined `Decl` (kind
//! `FunctionTemplate`/`ClassTemplate`) covering the whole `template<...> ...`
//! construct rather than as a template node pointing at a separately
//! instantiated member, since this parser never performs instantiation.

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::{Node, Parser};

use core_model::{Decl, DeclArena, DeclId, DeclKind, InactivePreprocBlock, SourceRange, SpecialMemberState, TranslationUnit};

use crate::compile_options::defined_macros;
use crate::preprocessor::scan_inactive_blocks;
use crate::FrontEndError;

/// The shipped [`FrontEnd`](crate::FrontEnd) implementation.
#[derive(Default)]
pub struct TreeSitterFrontEnd;

impl TreeSitterFrontEnd {
    pub fn new() -> Self {
        Self
    }
}

impl crate::FrontEnd for TreeSitterFrontEnd {
    fn parse(
        &self,
        main_file: &Path,
        source: String,
        compile_options: &[String],
    ) -> Result<TranslationUnit, FrontEndError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| FrontEndError::Parse {
                path: main_file.display().to_string(),
                message: format!("failed to load cpp grammar: {e}"),
            })?;

        let tree = parser.parse(&source, None).ok_or_else(|| FrontEndError::Parse {
            path: main_file.display().to_string(),
            message: "tree-sitter returned no tree".to_string(),
        })?;

        let macros = defined_macros(compile_options);
        let inactive_blocks: Vec<InactivePreprocBlock> = scan_inactive_blocks(&source, &macros);

        let mut builder = Builder {
            source: &source,
            arena: DeclArena::new(),
            namespace_ordinals: HashMap::new(),
        };

        let root = tree.root_node();
        let mut cursor = root.walk();
        let top_level = builder.walk_children(&root, &mut cursor, None);
        builder.canonicalize_redeclarations();

        tracing::debug!(
            target: "core_frontend",
            decls = builder.arena.len(),
            inactive_blocks = inactive_blocks.len(),
            "parsed translation unit"
        );

        Ok(TranslationUnit {
            main_file: main_file.to_path_buf(),
            source,
            decls: builder.arena,
            top_level,
            inactive_blocks,
        })
    }
}

struct Builder<'s> {
    source: &'s str,
    arena: DeclArena,
    /// Tracks how many times each namespace name has been (re)opened at a
    /// given lexical parent, so re-openings stay distinct vertices (§3).
    namespace_ordinals: HashMap<(Option<DeclId>, String), u32>,
}

impl<'s> Builder<'s> {
    fn text(&self, node: &Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn range_of(&self, node: &Node) -> SourceRange {
        let range = SourceRange::new(node.start_byte() as u32, node.end_byte() as u32);
        // Extend through a trailing ';' (§3: "expansion range extended
        // through the semicolon that terminates the declaration").
        match node.next_sibling() {
            Some(n) if n.kind() == ";" => range.extended_through(n.end_byte() as u32),
            _ => range,
        }
    }

    /// Walk every named child of `parent`, recording declarations into the
    /// arena with `lexical_parent` set to `enclosing`. Returns the ids
    /// created directly at this level, in source order.
    fn walk_children(&mut self, parent: &Node, cursor: &mut tree_sitter::TreeCursor, enclosing: Option<DeclId>) -> Vec<DeclId> {
        let mut out = Vec::new();
        for child in parent.named_children(cursor) {
            out.extend(self.convert(&child, enclosing));
        }
        out
    }

    fn preceding_comment(&self, node: &Node) -> Option<(SourceRange, String)> {
        // tree-sitter already excludes whitespace from the sibling chain, so
        // the immediately preceding sibling (if a comment) is adjacent modulo
        // blank lines; anything else directly before means no attached
        // comment.
        let sib = node.prev_sibling()?;
        if sib.kind() == "comment" {
            Some((self.range_of(&sib), self.text(&sib).to_string()))
        } else {
            None
        }
    }

    fn declarator_name<'n>(&self, node: &Node<'n>) -> Option<(String, Node<'n>)> {
        match node.kind() {
            "identifier" | "field_identifier" | "namespace_identifier" | "type_identifier" => {
                Some((self.text(node).to_string(), *node))
            }
            "destructor_name" => Some((self.text(node).to_string(), *node)),
            "qualified_identifier" => node
                .child_by_field_name("name")
                .and_then(|n| self.declarator_name(&n)),
            "pointer_declarator" | "reference_declarator" | "array_declarator" | "parenthesized_declarator" => node
                .child_by_field_name("declarator")
                .and_then(|n| self.declarator_name(&n)),
            "function_declarator" => node
                .child_by_field_name("declarator")
                .and_then(|n| self.declarator_name(&n)),
            "init_declarator" => node
                .child_by_field_name("declarator")
                .and_then(|n| self.declarator_name(&n)),
            _ => {
                // Fall back to scanning named children for the first
                // identifier-shaped node; keeps this resilient to grammar
                // wrapper kinds not enumerated above.
                let mut cursor = node.walk();
                node.named_children(&mut cursor)
                    .find_map(|c| self.declarator_name(&c))
            }
        }
    }

    fn special_member_state(&self, node: &Node) -> SpecialMemberState {
        let text = self.text(node);
        if text.contains("= delete") {
            SpecialMemberState::Deleted
        } else if text.contains("= default") {
            SpecialMemberState::Defaulted
        } else {
            SpecialMemberState::Ordinary
        }
    }

    fn is_virtual(&self, node: &Node) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|c| c.kind() == "virtual_function_specifier" || self.text(&c) == "virtual")
    }

    fn blank_decl(&mut self, kind: DeclKind, name: String, range: SourceRange, lexical_parent: Option<DeclId>) -> Decl {
        Decl {
            id: DeclId(0),
            kind,
            name,
            range,
            comment_range: None,
            raw_comment_text: None,
            in_main_file: true,
            canonical: DeclId(0),
            is_definition: true,
            is_main: false,
            is_virtual: false,
            special_member: SpecialMemberState::Ordinary,
            lexical_parent,
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

    fn convert(&mut self, node: &Node, enclosing: Option<DeclId>) -> Vec<DeclId> {
        match node.kind() {
            "function_definition" => self.convert_function(node, enclosing, true).into_iter().collect(),
            "declaration" => self.convert_declaration(node, enclosing),
            "struct_specifier" | "class_specifier" => self.convert_class(node, enclosing).into_iter().collect(),
            "namespace_definition" => self.convert_namespace(node, enclosing).into_iter().collect(),
            "template_declaration" => self.convert_template(node, enclosing).into_iter().collect(),
            "using_declaration" => self.convert_using_declaration(node, enclosing).into_iter().collect(),
            "alias_declaration" => self.convert_alias(node, enclosing).into_iter().collect(),
            "type_definition" => self.convert_typedef(node, enclosing).into_iter().collect(),
            "field_declaration" => self.convert_field(node, enclosing),
            "preproc_if" | "preproc_ifdef" | "preproc_elif" | "preproc_elifdef" => {
                // Recurse into every branch; the inactive-block remover
                // decides what actually gets deleted, not the collector.
                let mut out = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    out.extend(self.convert(&child, enclosing));
                }
                out
            }
            _ => Vec::new(),
        }
    }

    fn attach_comment(&self, decl: &mut Decl, node: &Node) {
        if let Some((range, text)) = self.preceding_comment(node) {
            decl.comment_range = Some(range);
            decl.raw_comment_text = Some(text);
        }
    }

    fn convert_function(&mut self, node: &Node, enclosing: Option<DeclId>, is_definition: bool) -> Option<DeclId> {
        let declarator = node.child_by_field_name("declarator")?;
        let (name, _) = self.declarator_name(&declarator)?;
        let is_main = name == "main";
        let range = self.range_of(node);
        let mut decl = self.blank_decl(DeclKind::Function, name, range, enclosing);
        decl.is_definition = is_definition;
        decl.is_main = is_main;
        decl.is_virtual = self.is_virtual(node);
        decl.special_member = self.special_member_state(node);
        self.attach_comment(&mut decl, node);
        Some(self.arena.insert(decl))
    }

    fn convert_declaration(&mut self, node: &Node, enclosing: Option<DeclId>) -> Vec<DeclId> {
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        if declarators.is_empty() {
            return Vec::new();
        }

        // A lone function_declarator with no body is a forward declaration.
        if declarators.len() == 1 {
            let d = &declarators[0];
            if Self::innermost_kind(d) == "function_declarator" {
                if let Some((name, _)) = self.declarator_name(d) {
                    let range = self.range_of(node);
                    let mut decl = self.blank_decl(DeclKind::Function, name, range, enclosing);
                    decl.is_definition = false;
                    decl.is_virtual = self.is_virtual(node);
                    decl.special_member = self.special_member_state(node);
                    self.attach_comment(&mut decl, node);
                    return vec![self.arena.insert(decl)];
                }
            }
        }

        let (group_start, group_end) = if declarators.len() > 1 {
            (Some(node.start_byte() as u32), Some(self.range_of(node).end))
        } else {
            (None, None)
        };
        let type_name = node.child_by_field_name("type").map(|n| self.text(&n).to_string());

        let mut out = Vec::new();
        for d in &declarators {
            let Some((name, name_node)) = self.declarator_name(d) else {
                continue;
            };
            let range = SourceRange::new(name_node.start_byte() as u32, d.end_byte() as u32);
            let mut decl = self.blank_decl(DeclKind::Variable, name, range, enclosing);
            decl.comma_group_start = group_start;
            decl.comma_group_end = group_end;
            decl.declared_type_name = type_name.clone();
            if group_start.is_none() {
                self.attach_comment(&mut decl, node);
            }
            out.push(self.arena.insert(decl));
        }
        out
    }

    fn innermost_kind(node: &Node) -> &'static str {
        match node.kind() {
            "function_declarator" => "function_declarator",
            "pointer_declarator" | "reference_declarator" | "array_declarator" | "init_declarator" => {
                node.child_by_field_name("declarator")
                    .map(|n| Self::innermost_kind(&n))
                    .unwrap_or("")
            }
            _ => "",
        }
    }

    fn convert_class(&mut self, node: &Node, enclosing: Option<DeclId>) -> Option<DeclId> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let body = node.child_by_field_name("body");
        let range = self.range_of(node);
        let mut decl = self.blank_decl(DeclKind::ClassRecord, name, range, enclosing);
        decl.is_definition = body.is_some();
        self.attach_comment(&mut decl, node);
        let id = self.arena.insert(decl);

        if let Some(body) = body {
            let mut cursor = body.walk();
            let members = self.walk_children(&body, &mut cursor, Some(id));
            let destructor = members.iter().copied().find(|m| {
                self.arena.get(*m).kind == DeclKind::Function && self.arena.get(*m).name.starts_with('~')
            });
            if let Some(dtor) = destructor {
                self.arena.get_mut(id).destructor = Some(dtor);
            }
        }
        Some(id)
    }

    fn convert_field(&mut self, node: &Node, enclosing: Option<DeclId>) -> Vec<DeclId> {
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        if declarators.is_empty() {
            return Vec::new();
        }
        let type_name = node.child_by_field_name("type").map(|n| self.text(&n).to_string());
        let mut out = Vec::new();
        for d in &declarators {
            let Some((name, name_node)) = self.declarator_name(d) else {
                continue;
            };
            let range = self.range_of(node);
            let is_method = Self::innermost_kind(d) == "function_declarator";
            let mut decl = self.blank_decl(
                if is_method { DeclKind::Function } else { DeclKind::Field },
                name,
                if is_method { range } else { SourceRange::new(name_node.start_byte() as u32, range.end) },
                enclosing,
            );
            decl.is_definition = !is_method;
            if is_method {
                decl.is_virtual = self.is_virtual(node);
                decl.special_member = self.special_member_state(node);
            } else {
                decl.declared_type_name = type_name.clone();
            }
            self.attach_comment(&mut decl, node);
            out.push(self.arena.insert(decl));
        }
        out
    }

    fn convert_namespace(&mut self, node: &Node, enclosing: Option<DeclId>) -> Option<DeclId> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let key = (enclosing, name.clone());
        let ordinal = self.namespace_ordinals.entry(key).or_insert(0);
        let this_ordinal = *ordinal;
        *ordinal += 1;

        let range = self.range_of(node);
        let mut decl = self.blank_decl(DeclKind::Namespace, name, range, enclosing);
        decl.namespace_reopen_ordinal = Some(this_ordinal);
        decl.canonical = DeclId(0); // overwritten to self below
        self.attach_comment(&mut decl, node);
        let id = self.arena.insert(decl);
        self.arena.get_mut(id).canonical = id;

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            self.walk_children(&body, &mut cursor, Some(id));
        }
        Some(id)
    }

    fn convert_template(&mut self, node: &Node, enclosing: Option<DeclId>) -> Option<DeclId> {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|c| !matches!(c.kind(), "template_parameter_list" | "comment"))?;
        let range = self.range_of(node);

        let (kind, name) = match inner.kind() {
            "function_definition" | "declaration" => {
                let declarator = inner.child_by_field_name("declarator");
                let name = declarator
                    .and_then(|d| self.declarator_name(&d))
                    .map(|(n, _)| n)
                    .unwrap_or_default();
                (DeclKind::FunctionTemplate, name)
            }
            "struct_specifier" | "class_specifier" => {
                let name = inner
                    .child_by_field_name("name")
                    .map(|n| self.text(&n).to_string())
                    .unwrap_or_default();
                (DeclKind::ClassTemplate, name)
            }
            "alias_declaration" => {
                let name = inner
                    .child_by_field_name("name")
                    .map(|n| self.text(&n).to_string())
                    .unwrap_or_default();
                (DeclKind::AliasTemplate, name)
            }
            _ => (DeclKind::FunctionTemplate, String::new()),
        };

        let is_definition = inner.kind() != "declaration" || inner.child_by_field_name("body").is_some();
        let mut decl = self.blank_decl(kind, name, range, enclosing);
        decl.is_definition = is_definition;
        self.attach_comment(&mut decl, node);
        Some(self.arena.insert(decl))
    }

    fn convert_using_declaration(&mut self, node: &Node, enclosing: Option<DeclId>) -> Option<DeclId> {
        let text = self.text(node);
        // Only "using namespace X;" is modeled (§4.1/§4.4's Using-directive
        // policy); a plain "using X::y;" brings in one name, not a namespace,
        // and has no counterpart in `DeclKind`, so it is left untouched.
        if !text.trim_start().starts_with("using namespace") {
            return None;
        }
        let target = text
            .trim_start_matches("using")
            .trim_start()
            .trim_start_matches("namespace")
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string();
        let range = self.range_of(node);
        let mut decl = self.blank_decl(DeclKind::UsingDirective, target.clone(), range, enclosing);
        decl.using_directive_target = Some(target);
        self.attach_comment(&mut decl, node);
        Some(self.arena.insert(decl))
    }

    fn convert_alias(&mut self, node: &Node, enclosing: Option<DeclId>) -> Option<DeclId> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let range = self.range_of(node);
        let mut decl = self.blank_decl(DeclKind::TypeAlias, name, range, enclosing);
        self.attach_comment(&mut decl, node);
        Some(self.arena.insert(decl))
    }

    fn convert_typedef(&mut self, node: &Node, enclosing: Option<DeclId>) -> Option<DeclId> {
        let mut cursor = node.walk();
        let declarator = node.children_by_field_name("declarator", &mut cursor).next()?;
        let (name, _) = self.declarator_name(&declarator)?;
        let range = self.range_of(node);
        let mut decl = self.blank_decl(DeclKind::Typedef, name, range, enclosing);
        self.attach_comment(&mut decl, node);
        Some(self.arena.insert(decl))
    }

    /// Merge same-name, same-scope, same-kind declarations onto one canonical
    /// representative, preferring a definition over a forward declaration
    /// (§3). Namespaces are excluded: each re-opening stays its own vertex.
    fn canonicalize_redeclarations(&mut self) {
        let mut groups: HashMap<(Option<DeclId>, String, DeclKind), Vec<DeclId>> = HashMap::new();
        for i in 0..self.arena.len() {
            let id = DeclId(i as u32);
            let d = self.arena.get(id);
            if d.kind == DeclKind::Namespace {
                continue;
            }
            groups
                .entry((d.lexical_parent, d.name.clone(), d.kind))
                .or_default()
                .push(id);
        }
        for ids in groups.into_values() {
            let canonical = ids
                .iter()
                .copied()
                .find(|id| self.arena.get(*id).is_definition)
                .unwrap_or(ids[0]);
            for id in ids {
                self.arena.get_mut(id).canonical = canonical;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrontEnd;
    use std::path::PathBuf;

    fn parse(src: &str) -> TranslationUnit {
        TreeSitterFrontEnd::new()
            .parse(&PathBuf::from("main.cpp"), src.to_string(), &[])
            .expect("parse should succeed")
    }

    #[test]
    fn scenario_one_unused_function_and_main() {
        let tu = parse("int unused(){return 1;} int main(){return 0;}");
        let names: Vec<&str> = tu.decls.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"unused"));
        assert!(names.contains(&"main"));
        let main_decl = tu.decls.iter().find(|d| d.name == "main").unwrap();
        assert!(main_decl.is_main);
    }

    #[test]
    fn scenario_two_caide_keep_comment_is_attached() {
        let tu = parse("/// caide keep\nint helper(){return 7;} int main(){return 0;}");
        let helper = tu.decls.iter().find(|d| d.name == "helper").unwrap();
        assert!(helper.raw_comment_text.as_deref().unwrap().contains("caide keep"));
    }

    #[test]
    fn scenario_three_virtual_methods_and_destructor_detected() {
        let tu = parse("struct A{virtual ~A(){} virtual void f(){}}; A a; int main(){return 0;}");
        let class = tu.decls.iter().find(|d| d.kind == DeclKind::ClassRecord && d.name == "A").unwrap();
        assert!(class.destructor.is_some());
        let f = tu.decls.iter().find(|d| d.name == "f").unwrap();
        assert!(f.is_virtual);
    }

    #[test]
    fn scenario_four_comma_group_variables_share_group_start() {
        let tu = parse("int a,b,c; int main(){return b;}");
        let vars: Vec<_> = tu.decls.iter().filter(|d| d.kind == DeclKind::Variable).collect();
        assert_eq!(vars.len(), 3);
        let starts: Vec<_> = vars.iter().map(|d| d.comma_group_start).collect();
        assert!(starts.iter().all(|s| s.is_some()));
        assert_eq!(starts[0], starts[1]);
        assert_eq!(starts[1], starts[2]);
    }
}
