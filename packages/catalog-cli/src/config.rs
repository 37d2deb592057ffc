//! Configuration file for the operator CLI.
//!
//! Settings are layered, lowest to highest precedence:
//! - `catalog-extract.toml` (or the file given with `--config`)
//! - environment (`OPENAI_API_KEY`, `.env` loaded through dotenvy)
//! - command-line flags
//!
//! The API key is never read from the file.

use anyhow::{Context, Result};
use catalog_extraction::FailurePolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "catalog-extract.toml";

/// Contents of the configuration file. Every field is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Model identifier
    pub model: Option<String>,

    /// API base URL override
    pub base_url: Option<String>,

    /// Custom extraction prompt
    pub prompt: Option<String>,

    /// Input sheet name
    pub sheet: Option<String>,

    /// Input column name
    pub column: Option<String>,

    /// Directory for timestamped output files
    pub output_dir: Option<PathBuf>,

    /// URLs processed at once
    pub concurrency: Option<usize>,

    /// `abort` or `isolate`
    pub failure_policy: Option<FailurePolicy>,

    /// Page fetch timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Page text limit sent to the model, in bytes
    pub max_content_chars: Option<usize>,
}

impl FileConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, the default file is read if
    /// present and an empty configuration is returned otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_fields() {
        let config: FileConfig = toml::from_str(
            r#"
            model = "gpt-4o"
            column = "Links"
            concurrency = 4
            failure_policy = "isolate"
            timeout_secs = 30
            output_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.column.as_deref(), Some("Links"));
        assert_eq!(config.concurrency, Some(4));
        assert_eq!(config.failure_policy, Some(FailurePolicy::Isolate));
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_api_key_is_rejected() {
        let result: Result<FileConfig, _> = toml::from_str(r#"api_key = "sk-secret""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_explicit_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "sheet = \"Sheet2\"\n").unwrap();

        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sheet.as_deref(), Some("Sheet2"));
    }
}
