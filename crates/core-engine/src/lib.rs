//! Orchestrator for the unused-declaration elimination engine (§3, §5, §6).
//!
//! `optimize` runs the whole pipeline in the order the concurrency model
//! mandates: parse, remove inactive preprocessor blocks, collect, force
//! late-parsed templates, solve reachability, run the optimizer visitor,
//! prune comma-groups, then apply every accepted edit in one sweep.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use core_frontend::{FrontEnd, FrontEndError, TreeSitterFrontEnd};
use core_rewrite::SmartRewriter;

/// The one fatal error case (§7): front-end/compilation failure. Everything
/// else the pipeline cannot determine is absent information, not an `Err`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    FrontEnd(#[from] FrontEndError),
}

/// Parse, analyze, and rewrite `source_file`, returning the optimized
/// translation-unit text (§6's entry point).
pub fn optimize(
    source_file: &Path,
    compile_options: &[String],
    macros_to_keep: &HashSet<String>,
) -> Result<String, EngineError> {
    let source = fs::read_to_string(source_file).map_err(|source_err| FrontEndError::Io {
        path: source_file.display().to_string(),
        source: source_err,
    })?;
    optimize_source(source_file, source, compile_options, macros_to_keep)
}

/// Same pipeline as [`optimize`], but over an in-memory source string rather
/// than a file path, used by tests driving the six literal scenarios.
pub fn optimize_source(
    main_file: &Path,
    source: String,
    compile_options: &[String],
    macros_to_keep: &HashSet<String>,
) -> Result<String, EngineError> {
    let front_end = TreeSitterFrontEnd::new();
    let mut tu = front_end.parse(main_file, source, compile_options)?;

    let mut rewriter = SmartRewriter::new(&tu.source);
    core_passes::remove_inactive_blocks(&tu.inactive_blocks, macros_to_keep, &mut rewriter);

    let info = core_passes::collect(&tu);
    core_passes::force_late_templates(&front_end, &mut tu, &info)?;

    let usage = core_passes::solve(&tu.decls, &info);
    core_passes::optimize(&tu.decls, &usage, &tu.inactive_blocks, &mut rewriter);
    core_passes::prune_comma_groups(&tu.decls, &info, &usage, &mut rewriter);

    rewriter.apply_changes();
    let rewritten = rewriter.rewritten_source();

    tracing::info!(
        target: "core_engine",
        original_len = tu.source.len(),
        rewritten_len = rewritten.len(),
        "optimize finished"
    );

    Ok(rewritten)
}
