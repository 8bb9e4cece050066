//! Run configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file overrides any subset of keys; command-line
//! flags override both.
//!
//! ## Config File Location
//!
//! `config.toml` in the working directory is picked up automatically. Pass
//! `--config <file>` to use another file (which then must exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! inputs = "inputs"              # Directory of input PNGs
//! output = "outputs"             # Output root (cleaned with [run] clean)
//! options = "options.json"       # Generation options
//! modifiers = "modifiers.json"   # Category → styles
//!
//! [backend]
//! url = "http://localhost:9000"  # Stable Diffusion UI server
//! ping_timeout_ms = 5000
//!
//! [thumbnails]
//! width = 128
//! height = 128
//!
//! [run]
//! clean = false                  # Remove the output root first
//! skip_existing = false          # Keep generations whose first image exists
//!
//! [index]
//! title = "Generated variants"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::diffusion::DEFAULT_BACKEND_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub paths: PathsConfig,
    pub backend: BackendConfig,
    pub thumbnails: ThumbnailsConfig,
    pub run: RunFlags,
    pub index: IndexConfig,
}

impl RunConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "backend.url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.backend.ping_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "backend.ping_timeout_ms must be non-zero".into(),
            ));
        }
        if self.thumbnails.width == 0 || self.thumbnails.height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width and thumbnails.height must be non-zero".into(),
            ));
        }
        for (key, path) in [
            ("paths.inputs", &self.paths.inputs),
            ("paths.output", &self.paths.output),
            ("paths.options", &self.paths.options),
            ("paths.modifiers", &self.paths.modifiers),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub inputs: PathBuf,
    pub output: PathBuf,
    pub options: PathBuf,
    pub modifiers: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            inputs: PathBuf::from("inputs"),
            output: PathBuf::from("outputs"),
            options: PathBuf::from("options.json"),
            modifiers: PathBuf::from("modifiers.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub url: String,
    /// Health-check timeout in milliseconds.
    pub ping_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            ping_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunFlags {
    pub clean: bool,
    pub skip_existing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub title: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            title: "Generated variants".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RunConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RunConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RunConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the run configuration.
///
/// With `path` set the file must exist; otherwise `config.toml` in the
/// working directory is used when present and stock defaults when not.
pub fn load_config(path: Option<&Path>) -> Result<RunConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            Some(load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?)
        }
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Style Forge Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override the values in this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Files and directories
# ---------------------------------------------------------------------------
[paths]
# Directory holding the input images. Each file must be named after its
# prompt: letters and spaces followed by .png (e.g. "Old Lighthouse.png").
inputs = "inputs"

# Output root. Generated images land in <output>/<category>/<style>/.
output = "outputs"

# Generation options (JSON): outputs, steps, guidance, width, height, seed, ...
options = "options.json"

# Modifiers (JSON): {"Category": ["style one", "style two"], ...}
modifiers = "modifiers.json"

# ---------------------------------------------------------------------------
# Stable Diffusion backend
# ---------------------------------------------------------------------------
[backend]
url = "http://localhost:9000"

# Timeout for the health check done before a run, in milliseconds.
ping_timeout_ms = 5000

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Exact thumbnail size; images are scaled to fill and center-cropped.
width = 128
height = 128

# ---------------------------------------------------------------------------
# Run behaviour
# ---------------------------------------------------------------------------
[run]
# Remove the output root before generating.
clean = false

# Skip a generation when its first image already exists (non-empty).
# Only the first image is checked.
skip_existing = false

# ---------------------------------------------------------------------------
# Index page
# ---------------------------------------------------------------------------
[index]
title = "Generated variants"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = RunConfig::default();
        assert_eq!(config.paths.inputs, PathBuf::from("inputs"));
        assert_eq!(config.paths.output, PathBuf::from("outputs"));
        assert_eq!(config.backend.url, "http://localhost:9000");
        assert_eq!((config.thumbnails.width, config.thumbnails.height), (128, 128));
        assert!(!config.run.clean);
        assert!(!config.run.skip_existing);
    }

    #[test]
    fn parse_partial_config() {
        let config: RunConfig = toml::from_str(
            r#"
[run]
skip_existing = true
"#,
        )
        .unwrap();
        assert!(config.run.skip_existing);
        assert!(!config.run.clean);
        assert_eq!(config.thumbnails.width, 128);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"width = 128"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"width = 64"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("width").unwrap().as_integer(), Some(64));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[thumbnails]
width = 128
height = 128
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[thumbnails]
height = 96
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let thumbs = merged.get("thumbnails").unwrap();
        assert_eq!(thumbs.get("height").unwrap().as_integer(), Some(96));
        assert_eq!(thumbs.get("width").unwrap().as_integer(), Some(128));
    }

    #[test]
    fn merge_toml_adds_new_keys() {
        let base: toml::Value = toml::from_str(r#"a = 1"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"b = 2"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(1));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(2));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<RunConfig, _> = toml::from_str(
            r#"
[run]
skip_exsiting = true
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<RunConfig, _> = toml::from_str(
            r#"
[thumbnail]
width = 90
"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_thumbnail_size() {
        let mut config = RunConfig::default();
        config.thumbnails.height = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("thumbnails"));
    }

    #[test]
    fn validate_backend_url_scheme() {
        let mut config = RunConfig::default();
        config.backend.url = "localhost:9000".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_path() {
        let mut config = RunConfig::default();
        config.paths.output = PathBuf::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("paths.output"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[backend]
url = "http://gpu-box:9000"

[index]
title = "Cats"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.backend.url, "http://gpu-box:9000");
        assert_eq!(config.index.title, "Cats");
        assert_eq!(config.backend.ping_timeout_ms, 5000);
    }

    #[test]
    fn load_config_explicit_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[run\nclean = true").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[thumbnails]
width = 0
"#,
        )
        .unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(&tmp.path().join("config.toml")).unwrap().is_none());
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: RunConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[paths]", "[backend]", "[thumbnails]", "[run]", "[index]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for key in ["paths", "backend", "thumbnails", "run", "index"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
