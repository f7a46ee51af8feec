use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo steps kept before the oldest snapshot is dropped.
    pub history_limit: usize,
    /// Element nesting the sanitizer descends before dropping content.
    pub max_sanitize_depth: usize,
    /// Prefixed to link URLs that carry no scheme.
    pub default_link_scheme: String,
    /// Applied to inserted images that come without dimensions.
    pub default_image_size: Option<ImageSize>,
    /// Upper bound for rows and columns of `table:insert`.
    pub max_table_size: usize,
    /// Markup a fresh editor starts from.
    pub initial_markup: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            max_sanitize_depth: 64,
            default_link_scheme: "https://".to_string(),
            default_image_size: Some(ImageSize { width: 300, height: 200 }),
            max_table_size: 100,
            initial_markup: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
