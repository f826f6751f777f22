//! `SourceInfo`: the output of the dependencies collector (§3, §4.1).

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::decl::DeclId;

/// Dependency graph between declarations plus the roots and side tables the
/// reachability solver and optimizer visitor need.
#[derive(Debug, Default)]
pub struct SourceInfo {
    /// `uses[from]` is the set of canonical declarations `from` depends on.
    pub uses: HashMap<DeclId, HashSet<DeclId>>,
    /// Root declarations: `main` and every `/// caide keep`-annotated decl.
    pub decls_to_keep: HashSet<DeclId>,
    /// Function templates whose bodies were late-parsed and must be forced
    /// (§4.2) before their source ranges are trustworthy.
    pub delayed_parsed_functions: Vec<DeclId>,
    /// Comma-group variable declarations, keyed by the group's shared start
    /// offset, in declaration order (§4.5).
    pub static_variables: BTreeMap<u32, Vec<DeclId>>,
}

impl SourceInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Implements `ref(from, to)` (§4.1): drop null endpoints (not
    /// representable here since `DeclId` is never null), otherwise record the
    /// edge. Callers are expected to have already canonicalized both ends per
    /// the "Edge insertion rule."
    pub fn add_use(&mut self, from: DeclId, to: DeclId) {
        self.uses.entry(from).or_default().insert(to);
    }

    pub fn add_root(&mut self, decl: DeclId) {
        self.decls_to_keep.insert(decl);
    }

    pub fn add_delayed_parsed_function(&mut self, decl: DeclId) {
        self.delayed_parsed_functions.push(decl);
    }

    pub fn add_static_variable(&mut self, group_start: u32, decl: DeclId) {
        self.static_variables.entry(group_start).or_default().push(decl);
    }

    pub fn uses_of(&self, decl: DeclId) -> impl Iterator<Item = DeclId> + '_ {
        self.uses.get(&decl).into_iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_use_is_idempotent_per_edge() {
        let mut info = SourceInfo::new();
        info.add_use(DeclId(0), DeclId(1));
        info.add_use(DeclId(0), DeclId(1));
        assert_eq!(info.uses_of(DeclId(0)).count(), 1);
    }

    #[test]
    fn static_variables_group_preserves_insertion_order() {
        let mut info = SourceInfo::new();
        info.add_static_variable(100, DeclId(0));
        info.add_static_variable(100, DeclId(1));
        info.add_static_variable(100, DeclId(2));
        assert_eq!(
            info.static_variables[&100],
            vec![DeclId(0), DeclId(1), DeclId(2)]
        );
    }
}
