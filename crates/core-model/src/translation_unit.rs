//! The parsed-program record a [`crate::FrontEnd`](../core-frontend) hands to
//! the engine: declarations plus the raw source text they were carved from.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::decl::DeclArena;
use crate::range::SourceRange;

/// A preprocessor-conditional branch the front end determined was not taken,
/// together with the macro identifiers its controlling expression referenced
/// (§4.7).
#[derive(Debug, Clone)]
pub struct InactivePreprocBlock {
    pub range: SourceRange,
    pub referenced_macros: HashSet<String>,
}

/// Everything downstream passes need about one parsed translation unit.
#[derive(Debug)]
pub struct TranslationUnit {
    pub main_file: PathBuf,
    pub source: String,
    pub decls: DeclArena,
    /// Top-level declaration order as the front end encountered them.
    pub top_level: Vec<crate::decl::DeclId>,
    pub inactive_blocks: Vec<InactivePreprocBlock>,
}

impl TranslationUnit {
    pub fn source_text(&self, range: &SourceRange) -> &str {
        &self.source[range.start as usize..range.end as usize]
    }
}
