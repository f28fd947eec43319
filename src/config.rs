//! Load configuration: which NewGRFs to load, their parameters, and the
//! game settings the variable engine reports to them.
//!
//! ```json
//! {
//!   "files": [
//!     { "path": "trains.grf", "params": [1, 0, 3] },
//!     { "path": "stations.grf" }
//!   ],
//!   "settings": { "climate": "arctic", "road_side": "right", "start_year": 1950 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Root configuration consumed by [`crate::loader::Loader`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Files to load, in load order.
    pub files: Vec<GrfEntry>,
    pub settings: GameSettings,
}

/// One configured NewGRF.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GrfEntry {
    /// Path handed to the [`crate::source::FileProvider`].
    pub path: String,
    /// Externally configured parameters. At most 128 are used.
    #[serde(default)]
    pub params: Vec<u32>,
}

/// Landscape type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Climate {
    #[default]
    Temperate,
    Arctic,
    Tropic,
    Toyland,
}

impl Climate {
    /// Value reported through the variable engine.
    pub fn id(self) -> u32 {
        match self {
            Climate::Temperate => 0,
            Climate::Arctic => 1,
            Climate::Tropic => 2,
            Climate::Toyland => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadSide {
    #[default]
    Left,
    Right,
}

/// Game settings visible to NewGRFs while they load.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GameSettings {
    pub climate: Climate,
    pub road_side: RoadSide,
    pub start_year: u16,
    /// Weight multiplier for freight trains.
    pub freight_trains: u8,
    /// Extra patch-flag bits to report as enabled, numbered across all
    /// eight flag words (bit 32 is bit 0 of word 1).
    pub extra_patch_flags: Vec<u32>,
    /// Sprite id assigned to the first raw sprite of the first sprite set.
    pub first_custom_sprite: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            climate: Climate::Temperate,
            road_side: RoadSide::Left,
            start_year: 1950,
            freight_trains: 1,
            extra_patch_flags: Vec::new(),
            first_custom_sprite: 0x4000,
        }
    }
}

impl LoadConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Append a file to the load order.
    pub fn with_file(mut self, path: impl Into<String>, params: &[u32]) -> Self {
        self.files.push(GrfEntry {
            path: path.into(),
            params: params.to_vec(),
        });
        self
    }

    pub fn with_settings(mut self, settings: GameSettings) -> Self {
        self.settings = settings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_json() {
        let cfg = LoadConfig::from_json_str(
            r#"{ "files": [ { "path": "a.grf", "params": [1, 2] }, { "path": "b.grf" } ],
                 "settings": { "climate": "arctic" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.files.len(), 2);
        assert_eq!(cfg.files[0].params, vec![1, 2]);
        assert!(cfg.files[1].params.is_empty());
        assert_eq!(cfg.settings.climate, Climate::Arctic);
        assert_eq!(cfg.settings.start_year, 1950);
    }

    #[test]
    fn empty_object_is_default() {
        let cfg = LoadConfig::from_json_str("{}").unwrap();
        assert!(cfg.files.is_empty());
        assert_eq!(cfg.settings.road_side, RoadSide::Left);
    }

    #[test]
    fn rejects_garbage() {
        assert!(LoadConfig::from_json_str("[1, 2").is_err());
    }
}
