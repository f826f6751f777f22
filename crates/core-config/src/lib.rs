//! Configuration loading for the unused-declaration elimination engine (§6).
//!
//! Loads an optional `caide-optimize.toml` carrying the default
//! `macros_to_keep` set and a default list of compile-driver tokens, merged
//! with whatever the CLI supplies. Follows the teacher's config-loader
//! pattern: `serde` + `toml`, tolerant of unknown fields, defaults silently
//! on a missing or unparsable file.

use std::collections::HashSet;
use std::{fs, path::PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub macros_to_keep: Vec<String>,
    #[serde(default)]
    pub compile_options: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Best-effort config path: prefer a local working-directory file before
/// falling back to the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("caide-optimize.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("caide-optimize").join("caide-optimize.toml");
    }
    PathBuf::from("caide-optimize.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "loaded caide-optimize.toml");
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                info!(target: "config", path = %path.display(), error = %e, "failed to parse config, using defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Merge the config file's defaults with CLI-supplied overrides:
    /// `macros_to_keep` accumulates (config defaults plus CLI additions),
    /// `compile_options` is config defaults followed by CLI options so the
    /// CLI's own flags take precedence where the front end treats later
    /// flags as overriding earlier ones.
    pub fn merge_macros_to_keep(&self, cli: &[String]) -> HashSet<String> {
        self.file
            .macros_to_keep
            .iter()
            .cloned()
            .chain(cli.iter().cloned())
            .collect()
    }

    pub fn merge_compile_options(&self, cli: &[String]) -> Vec<String> {
        self.file
            .compile_options
            .iter()
            .cloned()
            .chain(cli.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_caide_config__.toml"))).unwrap();
        assert!(cfg.file.macros_to_keep.is_empty());
        assert!(cfg.file.compile_options.is_empty());
    }

    #[test]
    fn parses_macros_to_keep_and_compile_options() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "macros_to_keep = [\"DEBUG\", \"FEATURE\"]\ncompile_options = [\"-std=c++17\"]\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.macros_to_keep, vec!["DEBUG", "FEATURE"]);
        assert_eq!(cfg.file.compile_options, vec!["-std=c++17"]);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "this is not valid toml {{{").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.file.macros_to_keep.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "macros_to_keep = [\"X\"]\nfuture_field = 42\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.macros_to_keep, vec!["X"]);
    }

    #[test]
    fn merge_macros_combines_config_and_cli() {
        let mut cfg = Config::default();
        cfg.file.macros_to_keep = vec!["A".to_string()];
        let merged = cfg.merge_macros_to_keep(&["B".to_string()]);
        assert!(merged.contains("A"));
        assert!(merged.contains("B"));
    }

    #[test]
    fn merge_compile_options_appends_cli_after_config_defaults() {
        let mut cfg = Config::default();
        cfg.file.compile_options = vec!["-I/usr/include".to_string()];
        let merged = cfg.merge_compile_options(&["-std=c++20".to_string()]);
        assert_eq!(merged, vec!["-I/usr/include", "-std=c++20"]);
    }
}
