//! The compiler front-end boundary (§6).
//!
//! `spec.md` treats the front end as an external collaborator: a tooling
//! driver, a translation-unit AST with implicit-code visitation, a source
//! manager, a preprocessor with conditional-region callbacks, and a late-parse
//! hook. This crate supplies the one concrete adapter this repository ships,
//! [`TreeSitterFrontEnd`], behind the [`FrontEnd`] trait, so the pipeline
//! runs end to end on the scenarios in §8.
//!
//! `tree-sitter-cpp` is a structural/syntactic parser: it has no semantic
//! analyzer, so it cannot perform overload resolution or instantiate
//! templates the way a real Clang front end would. `core-passes` never
//! special-cases this; a fuller front end (e.g. bound to `libclang`) can
//! implement the same trait without touching engine code.

mod compile_options;
mod preprocessor;
mod treesitter;

pub use compile_options::defined_macros;
pub use preprocessor::scan_inactive_blocks;
pub use treesitter::TreeSitterFrontEnd;

use std::path::Path;

use core_model::TranslationUnit;

/// One fatal error kind (§7.1) plus file I/O failure. Everything else the
/// front end cannot determine is simply absent from the produced
/// `TranslationUnit` rather than an `Err` (§7: "errors are modeled as absence
/// of information").
#[derive(Debug, thiserror::Error)]
pub enum FrontEndError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Abstraction boundary a concrete C++ parser is plugged in behind.
pub trait FrontEnd {
    /// Parse `main_file` (whose already-read contents are `source`) under
    /// `compile_options`, producing a `TranslationUnit` the engine can walk.
    fn parse(
        &self,
        main_file: &Path,
        source: String,
        compile_options: &[String],
    ) -> Result<TranslationUnit, FrontEndError>;

    /// Force the body of a late-parsed template function to be fully parsed
    /// (§4.2), so its source range becomes trustworthy. `tree_sitter` parses
    /// eagerly and has no deferred-parsing concept, so the default
    /// implementation is a no-op; a `libclang`-backed front end would invoke
    /// its forced-instantiation hook here under diagnostic suppression.
    fn force_late_parse(&self, _tu: &mut TranslationUnit, _decl: core_model::DeclId) -> Result<(), FrontEndError> {
        Ok(())
    }
}
