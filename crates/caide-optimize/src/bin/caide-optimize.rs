//! `caide-optimize` CLI entrypoint.
//!
//! Parses arguments, loads `caide-optimize.toml`, and hands the merged
//! configuration to [`core_engine::optimize`]. Owns no engine logic itself;
//! the pipeline lives entirely in `core-engine`/`core-passes` (§6 Non-goals).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "caide-optimize", version, about = "Unused-declaration elimination for inlined C++ sources")]
struct Args {
    /// Path to the translation unit to optimize.
    source_file: PathBuf,

    /// Write the rewritten source here instead of stdout.
    #[arg(long = "output", short = 'o')]
    output: Option<PathBuf>,

    /// Optional configuration file path (overrides discovery of
    /// `caide-optimize.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Compile-driver token (include path, language standard, define).
    /// May be repeated.
    #[arg(long = "compile-option")]
    compile_options: Vec<String>,

    /// Macro whose inactive conditional blocks must be preserved verbatim.
    /// May be repeated.
    #[arg(long = "keep-macro")]
    keep_macros: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        error!(target: "runtime", ?err, "caide-optimize failed");
        return Err(err);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = core_config::load_from(args.config.clone()).context("loading caide-optimize.toml")?;
    let compile_options = config.merge_compile_options(&args.compile_options);
    let macros_to_keep = config.merge_macros_to_keep(&args.keep_macros);

    tracing::info!(
        target: "runtime",
        source_file = %args.source_file.display(),
        compile_option_count = compile_options.len(),
        macros_to_keep_count = macros_to_keep.len(),
        "starting optimize"
    );

    let rewritten = core_engine::optimize(&args.source_file, &compile_options, &macros_to_keep)
        .map_err(anyhow::Error::from)
        .with_context(|| format!("optimizing {}", args.source_file.display()))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rewritten).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            print!("{rewritten}");
        }
    }

    Ok(())
}
