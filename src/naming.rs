//! Filename conventions for inputs and generated outputs.
//!
//! ## Inputs
//!
//! An input image's filename *is* its prompt. The whole basename must be
//! letters and spaces followed by `.png` (extension case-insensitive):
//!
//! - `Cat.png` → `"Cat"`
//! - `Old Lighthouse.PNG` → `"Old Lighthouse"`
//! - `cat1.png` → rejected (digit)
//! - `my-cat.png` → rejected (dash)
//!
//! A rejected name is a configuration error for the whole run; see
//! [`plan`](crate::plan).
//!
//! ## Outputs
//!
//! Every generation writes `<name>-<index>-full.png` into its style
//! directory, and each full image gets a `<name>-<index>-thumb.png` sibling:
//!
//! ```text
//! outputs/Color/red/
//! ├── Cat-0-full.png
//! ├── Cat-0-thumb.png
//! ├── Cat-1-full.png
//! └── Cat-1-thumb.png
//! ```

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static INPUT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z ]+)\.png$").expect("input name pattern must compile"));

/// Extract the prompt name from an input filename.
///
/// Returns `None` when the filename does not follow the input convention.
pub fn prompt_name(file_name: &str) -> Option<&str> {
    INPUT_NAME
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Compose the full prompt for an input name and a style tag.
pub fn compose_prompt(name: &str, style: &str) -> String {
    format!("{name}, {style}")
}

/// Maps an output index to the files a generation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    dir: PathBuf,
    stem: String,
}

impl OutputNaming {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Path of the generated full-size image for `index`.
    pub fn full(&self, index: u32) -> PathBuf {
        self.dir.join(format!("{}-{}-full.png", self.stem, index))
    }

    /// Path of the thumbnail derived from [`full`](Self::full).
    pub fn thumb(&self, index: u32) -> PathBuf {
        self.dir.join(format!("{}-{}-thumb.png", self.stem, index))
    }
}
