//! Canvas configuration.

use crate::elements::Color;
use crate::grid::{GridError, GridSettings};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Startup settings for a [`Canvas`](crate::Canvas). Missing JSON fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasConfig {
    pub grid: GridSettings,
    /// Drawing surface size in pixels.
    pub viewport_size: Size,
    pub ortho_mode: bool,
    /// Color of the `default` layer.
    pub default_layer_color: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            viewport_size: Size::new(800.0, 600.0),
            ortho_mode: false,
            default_layer_color: Color::black(),
        }
    }
}

impl CanvasConfig {
    pub fn validate(&self) -> Result<(), GridError> {
        self.grid.validate()
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CanvasConfig::from_json(r#"{"orthoMode": true, "grid": {"spacing": 10}}"#).unwrap();
        assert!(config.ortho_mode);
        assert!((config.grid.spacing - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.grid.subdivisions, 10);
        assert_eq!(config.viewport_size, Size::new(800.0, 600.0));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = CanvasConfig {
            default_layer_color: Color::rgb(1, 2, 3),
            ..Default::default()
        };
        let back = CanvasConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validate_rejects_bad_grid() {
        let config = CanvasConfig::from_json(r#"{"grid": {"subdivisions": 0}}"#).unwrap();
        assert_eq!(config.validate(), Err(GridError::InvalidSubdivisions));
    }
}
