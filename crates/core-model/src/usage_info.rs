//! `UsageInfo`: the output of the reachability solver (§3, §4.3).

use std::collections::{BTreeSet, HashSet};

use crate::decl::DeclId;
use crate::range::SourceRange;

/// Membership test the optimizer visitor and comma-group pruner consult.
/// Carries two independent indices over the same reachable set: by canonical
/// declaration id, and by source range. The range index exists because a
/// declaration reached through one AST node may have its *range* observed
/// through a structurally different but textually identical node (e.g. a
/// function template vs. its templated function), see §3 and the Open
/// Question in §9.
#[derive(Debug, Default)]
pub struct UsageInfo {
    used: HashSet<DeclId>,
    used_ranges: BTreeSet<SourceRange>,
}

impl UsageInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, decl: DeclId) -> bool {
        self.used.insert(decl)
    }

    pub fn mark_range(&mut self, range: SourceRange) {
        self.used_ranges.insert(range);
    }

    pub fn is_used(&self, decl: DeclId) -> bool {
        self.used.contains(&decl)
    }

    pub fn range_is_used(&self, range: &SourceRange) -> bool {
        self.used_ranges.contains(range)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
