//! Modifier categories (`modifiers.json`).
//!
//! A JSON object mapping each category to its ordered list of style tags:
//!
//! ```json
//! {
//!   "Color": ["red", "blue"],
//!   "Medium": ["oil painting", "charcoal sketch"]
//! }
//! ```
//!
//! Categories keep the order they have in the file; the plan is built in
//! that order. Category and style names become directory names under the
//! output root, so they must be non-empty and free of path separators.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModifiersError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid modifier name {name:?} in category {category:?}")]
    InvalidName { category: String, name: String },
}

/// Ordered mapping of category name to style tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(IndexMap<String, Vec<String>>);

impl Modifiers {
    /// Iterate categories in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(category, styles)| (category.as_str(), styles.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject names that cannot safely be used as a directory component.
    pub fn validate(&self) -> Result<(), ModifiersError> {
        for (category, styles) in self.iter() {
            if !is_path_safe(category) {
                return Err(ModifiersError::InvalidName {
                    category: category.to_string(),
                    name: category.to_string(),
                });
            }
            if let Some(style) = styles.iter().find(|s| !is_path_safe(s)) {
                return Err(ModifiersError::InvalidName {
                    category: category.to_string(),
                    name: style.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<C, S> FromIterator<(C, Vec<S>)> for Modifiers
where
    C: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, Vec<S>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(c, styles)| (c.into(), styles.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

fn is_path_safe(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// Parse and validate modifiers from a JSON string.
pub fn parse_modifiers(json: &str) -> Result<Modifiers, ModifiersError> {
    let modifiers: Modifiers = serde_json::from_str(json)?;
    modifiers.validate()?;
    Ok(modifiers)
}

/// Load and validate `modifiers.json`.
pub fn load_modifiers(path: &Path) -> Result<Modifiers, ModifiersError> {
    let content = fs::read_to_string(path)?;
    parse_modifiers(&content)
}
