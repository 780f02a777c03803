//! Configuration for the IR tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (scripture-ir.toml)
//! - Environment variables (SCRIPTURE_IR__*)
//!
//! ## Example config file (scripture-ir.toml):
//! ```toml
//! [validation]
//! check_references = true
//! fail_on_hash_mismatch = true
//!
//! [hashing]
//! stamp_on_write = true
//!
//! [mapping]
//! tables_dir = "./versification"
//! target_versification = "KJV"
//! assess_loss = true
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrConfig {
    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub hashing: HashingConfig,

    #[serde(default)]
    pub mapping: MappingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Also check that span, anchor, and annotation ids resolve
    #[serde(default)]
    pub check_references: bool,

    /// Treat a stored hash that no longer matches its text as fatal
    #[serde(default = "default_true")]
    pub fail_on_hash_mismatch: bool,
}

/// Hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Stamp every content block before writing a corpus
    #[serde(default = "default_true")]
    pub stamp_on_write: bool,
}

/// Versification mapping settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Directory of mapping table JSON files
    #[serde(default)]
    pub tables_dir: Option<PathBuf>,

    /// Default target system for `map`
    #[serde(default)]
    pub target_versification: Option<String>,

    /// Downgrade the loss report for split, merge, and missing entries
    #[serde(default)]
    pub assess_loss: bool,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    /// Canonical encoding: sorted keys, no whitespace
    Compact,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_references: false,
            fail_on_hash_mismatch: true,
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            stamp_on_write: true,
        }
    }
}

impl IrConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "scripture-ir.toml",
            ".scripture-ir.toml",
            "config/scripture-ir.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("dev", "familiar", "scripture-ir") {
            let xdg_config = dirs.config_dir().join("scripture-ir.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCRIPTURE_IR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Tables directory, resolved against the working directory
    pub fn tables_dir(&self) -> Option<PathBuf> {
        self.mapping.tables_dir.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = IrConfig::default();
        assert!(config.validation.fail_on_hash_mismatch);
        assert!(!config.validation.check_references);
        assert!(config.hashing.stamp_on_write);
        assert_eq!(config.output.format, OutputFormat::Pretty);
        assert!(config.tables_dir().is_none());
    }

    #[test]
    fn test_serialize_config() {
        let config = IrConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[hashing]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[validation]
check_references = true

[mapping]
tables_dir = "/srv/versification"
target_versification = "LXX"

[output]
format = "compact"
"#,
        )
        .unwrap();

        let config = IrConfig::load_from(Some(&path)).unwrap();
        assert!(config.validation.check_references);
        assert!(config.validation.fail_on_hash_mismatch);
        assert_eq!(config.mapping.target_versification.as_deref(), Some("LXX"));
        assert_eq!(config.tables_dir(), Some(PathBuf::from("/srv/versification")));
        assert_eq!(config.output.format, OutputFormat::Compact);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = IrConfig::default();
        config.mapping.assess_loss = true;
        config.save(&path).unwrap();

        let loaded = IrConfig::load_from(Some(&path)).unwrap();
        assert!(loaded.mapping.assess_loss);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(IrConfig::load_from(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
