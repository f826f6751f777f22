//! Data model shared by every stage of the unused-declaration elimination
//! pipeline: declaration identity, source ranges, and the two records that
//! flow between the collector, the solver, and the optimizer visitor.

mod decl;
mod range;
mod source_info;
mod translation_unit;
mod usage_info;

pub use decl::{Decl, DeclArena, DeclId, DeclKind, SpecialMemberState};
pub use range::SourceRange;
pub use source_info::SourceInfo;
pub use translation_unit::{InactivePreprocBlock, TranslationUnit};
pub use usage_info::UsageInfo;
