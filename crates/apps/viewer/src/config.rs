use serde::{Deserialize, Serialize};
use std::path::Path;
use streaming::{ImagerySource, TerrainSource};

use crate::view_state::{Preset, ViewState};

/// Viewer settings, loadable from JSON. Every field has a default, so `{}` is
/// a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub terrain: TerrainSource,
    pub imagery: ImagerySource,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub load_texture: bool,
    pub initial_view: ViewState,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainSource::default(),
            imagery: ImagerySource::default(),
            min_zoom: 0,
            max_zoom: 15,
            load_texture: false,
            initial_view: Preset::GrandCanyon.view_state(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: String },
    Parse { source: String },
    InvalidZoomRange { min_zoom: u8, max_zoom: u8 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "cannot read {path}: {source}"),
            ConfigError::Parse { source } => write!(f, "invalid viewer config: {source}"),
            ConfigError::InvalidZoomRange { min_zoom, max_zoom } => {
                write!(f, "min_zoom {min_zoom} is above max_zoom {max_zoom}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            source: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::InvalidZoomRange {
                min_zoom: self.min_zoom,
                max_zoom: self.max_zoom,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use streaming::MeshAlgorithm;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(ViewerConfig::from_json_str("{}").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{"load_texture": true, "terrain": {"mesh_algorithm": "pymartini"}}"#,
        )
        .unwrap();
        assert!(config.load_texture);
        assert_eq!(config.terrain.mesh_algorithm, MeshAlgorithm::Martini);
        assert_eq!(config.terrain.mosaic_url, "terrarium");
        assert_eq!(config.max_zoom, 15);
    }

    #[test]
    fn rejects_inverted_zoom_window() {
        let err = ViewerConfig::from_json_str(r#"{"min_zoom": 10, "max_zoom": 4}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidZoomRange {
                min_zoom: 10,
                max_zoom: 4
            }
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_zoom": 14}}"#).unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.max_zoom, 14);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ViewerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(matches!(
            ViewerConfig::from_json_str("{"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
