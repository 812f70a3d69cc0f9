//! Block model parsing.
//!
//! Only the parts of a model that decide palette membership are read: the
//! parent chain entry and the texture variables.

use serde::Deserialize;
use std::collections::HashMap;

/// Parent model of blocks that show one texture on all six faces.
const CUBE_ALL: &str = "minecraft:block/cube_all";

/// A parsed block model from models/block/*.json.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockModel {
    /// Parent model to inherit from.
    #[serde(default)]
    pub parent: Option<String>,

    /// Texture variable definitions.
    #[serde(default)]
    pub textures: HashMap<String, String>,
}

impl BlockModel {
    /// Get the full parent resource location.
    pub fn parent_location(&self) -> Option<String> {
        self.parent.as_ref().map(|p| {
            if p.contains(':') {
                p.clone()
            } else {
                format!("minecraft:{}", p)
            }
        })
    }

    /// Whether this model inherits directly from `cube_all`.
    pub fn is_cube_all(&self) -> bool {
        self.parent_location()
            .map(|p| p.starts_with(CUBE_ALL))
            .unwrap_or(false)
    }

    /// The texture shown on every face of a `cube_all` model.
    ///
    /// Returns None when `all` is missing or is itself an unresolved `#` reference.
    pub fn all_texture(&self) -> Option<&str> {
        self.textures
            .get("all")
            .map(|s| s.as_str())
            .filter(|s| !s.starts_with('#'))
    }
}
