//! Declaration identity and the per-declaration facts the collector and
//! optimizer visitor need (§3, §4.1, §4.4).

use crate::range::SourceRange;

/// Dense arena index into a [`DeclArena`]. Stable for the lifetime of a single
/// `optimize()` run only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// What kind of declaration a [`Decl`] represents. The optimizer visitor's
/// deletion table (§4.4) switches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Empty,
    Function,
    FunctionTemplate,
    ClassRecord,
    ClassTemplate,
    Namespace,
    Typedef,
    TypeAlias,
    AliasTemplate,
    UsingDirective,
    Variable,
    Field,
    Lambda,
}

/// Whether a function/method declaration is `= delete`d, `= default`ed, or
/// neither. The optimizer visitor only applies its unused-based deletion rule
/// to the "neither" case (§4.4: "Function (non-deleted, non-defaulted)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialMemberState {
    #[default]
    Ordinary,
    Deleted,
    Defaulted,
}

/// A single declaration node as presented by the front end, already reduced to
/// the facts the engine needs. Redeclarations of one logical entity are
/// distinct `Decl`s joined through `canonical`; namespaces are the one kind
/// that is deliberately never canonicalized onto another node (§3).
#[derive(Debug, Clone)]
pub struct Decl {
    pub id: DeclId,
    pub kind: DeclKind,
    pub name: String,
    /// Expansion range, already extended through a trailing `;` if one
    /// terminates the declaration (§3).
    pub range: SourceRange,
    /// Range of an immediately preceding raw comment, if any.
    pub comment_range: Option<SourceRange>,
    pub raw_comment_text: Option<String>,
    pub in_main_file: bool,
    /// The representative node for this logical entity. Equal to `id` for
    /// canonical declarations and always equal to `id` for namespaces.
    pub canonical: DeclId,
    /// This is a definition (has a body), not merely a forward declaration.
    pub is_definition: bool,
    pub is_main: bool,
    pub is_virtual: bool,
    pub special_member: SpecialMemberState,
    /// Enclosing non-function declaration context (class or namespace), used
    /// for the "any declaration gets an edge to its enclosing context" rule.
    pub lexical_parent: Option<DeclId>,
    /// Destructor of this class record, if declared.
    pub destructor: Option<DeclId>,
    /// Specialization/instantiation -> primary template it was instantiated from.
    pub instantiated_from: Option<DeclId>,
    /// Alias declaration -> the alias template it describes (if any).
    pub described_template: Option<DeclId>,
    /// Template declaration -> the templated function/record it wraps.
    pub templated_decl: Option<DeclId>,
    /// For `UsingDirective`: the namespace name it brings into scope.
    pub using_directive_target: Option<String>,
    /// Disambiguates otherwise-identical namespace re-openings so each one is
    /// a distinct graph vertex (§3, §9).
    pub namespace_reopen_ordinal: Option<u32>,
    /// For a `Variable` that is one declarator of a multi-declarator
    /// statement (`int a, b, c;`), the shared expansion start of the whole
    /// group; `None` for a single-declarator statement. The front end sets
    /// this from the enclosing declaration-group node; the collector uses it
    /// to populate `SourceInfo::static_variables` (§3, §4.5).
    pub comma_group_start: Option<u32>,
    /// For a `Variable` that is one declarator of a multi-declarator
    /// statement, the end of the whole statement including its terminating
    /// `;` (individual declarators' own `range` stops at the declarator,
    /// never at the shared semicolon). `None` for a single-declarator
    /// statement.
    pub comma_group_end: Option<u32>,
    /// Textual spelling of the declared type (`Variable`/`Field` only), used
    /// for the name-based type-reference walk `refType` (§4.1). Since this
    /// front end never resolves types semantically, resolution against
    /// another `Decl`'s name is the only form of `refType` it can perform.
    pub declared_type_name: Option<String>,
}

impl Decl {
    pub fn is_redeclaration_without_body(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Function | DeclKind::FunctionTemplate | DeclKind::ClassRecord | DeclKind::ClassTemplate
        ) && !self.is_definition
    }
}

/// Owns every `Decl` produced for one translation unit.
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self { decls: Vec::new() }
    }

    /// Insert a new declaration, returning its id. `canonical` on the
    /// supplied `Decl` is expected to already be set (defaulting to its own id
    /// for a first-seen canonical form or a namespace).
    pub fn insert(&mut self, mut decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        decl.id = id;
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Canonicalize `id` per §3: namespaces stand for themselves, everything
    /// else resolves to its `canonical` field.
    pub fn canonicalize(&self, id: DeclId) -> DeclId {
        let decl = self.get(id);
        if matches!(decl.kind, DeclKind::Namespace) {
            id
        } else {
            decl.canonical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(kind: DeclKind, name: &str, start: u32, end: u32) -> Decl {
        Decl {
            id: DeclId(0),
            kind,
            name: name.to_string(),
            range: SourceRange::new(start, end),
            comment_range: None,
            raw_comment_text: None,
            in_main_file: true,
            canonical: DeclId(0),
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
    fn namespaces_canonicalize_to_themselves_even_when_linked() {
        let mut arena = DeclArena::new();
        let ns_a = arena.insert(blank(DeclKind::Namespace, "n", 0, 10));
        let mut ns_b_decl = blank(DeclKind::Namespace, "n", 20, 30);
        ns_b_decl.canonical = ns_a; // would-be canonical link, must be ignored
        let ns_b = arena.insert(ns_b_decl);
        assert_eq!(arena.canonicalize(ns_a), ns_a);
        assert_eq!(arena.canonicalize(ns_b), ns_b);
    }

    #[test]
    fn non_namespace_canonicalizes_through_canonical_field() {
        let mut arena = DeclArena::new();
        let canon = arena.insert(blank(DeclKind::Function, "f", 0, 5));
        let mut redecl = blank(DeclKind::Function, "f", 10, 15);
        redecl.is_definition = false;
        redecl.canonical = canon;
        let redecl_id = arena.insert(redecl);
        assert_eq!(arena.canonicalize(redecl_id), canon);
    }
}
