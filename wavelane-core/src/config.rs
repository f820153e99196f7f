//! Timeline configuration
//!
//! Loaded from JSON. Every section has defaults, so a config file only
//! needs the keys it changes.

use crate::error::ConfigError;
use crate::layer::LayerParams;
use crate::selection::DEFAULT_SELECTED_CLASS;
use crate::track::DEFAULT_TRACK_HEIGHT;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning of the interaction states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Stretch ratio change per pixel of vertical drag in centered zoom
    pub zoom_sensitivity: f64,
    /// Lowest root stretch ratio reachable by centered zoom
    pub min_zoom_ratio: f64,
    /// Largest drag area (px²) still treated as a click by the selection
    pub click_tolerance: f64,
    /// Keep zoomed-out content from scrolling past the left edge
    pub clamp_zoomed_out_offset: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            zoom_sensitivity: 0.01,
            min_zoom_ratio: 0.01,
            click_tolerance: 0.0,
            clamp_zoomed_out_offset: false,
        }
    }
}

/// Timeline configuration (root viewport, defaults, interactions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub pixels_per_second: f64,
    pub visible_width: f64,
    pub maintain_visible_duration: bool,
    /// Height of tracks created by `Timeline::add_track`
    pub track_height: f64,
    /// Parameters of the preset layers
    pub layer: LayerParams,
    /// Class given to selected items
    pub selected_class: String,
    pub interaction: InteractionConfig,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: 100.0,
            visible_width: 1000.0,
            maintain_visible_duration: false,
            track_height: DEFAULT_TRACK_HEIGHT,
            layer: LayerParams::default(),
            selected_class: DEFAULT_SELECTED_CLASS.to_string(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl TimelineConfig {
    /// Load a config file
    /// Returns the default config if the file is missing, malformed or invalid
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load timeline config {:?}: {}", path, e);
                warn!("Using default timeline configuration");
                Self::default()
            }
        }
    }

    /// Load a config file, surfacing I/O, parse and validation errors
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TimelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the coordinate engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("pixels_per_second", self.pixels_per_second),
            ("visible_width", self.visible_width),
            ("track_height", self.track_height),
            ("layer.height", self.layer.height),
            ("interaction.min_zoom_ratio", self.interaction.min_zoom_ratio),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.layer.y_domain[0] == self.layer.y_domain[1] {
            return Err(ConfigError::Invalid("layer.y_domain has zero width".to_string()));
        }
        if self.interaction.click_tolerance < 0.0 {
            return Err(ConfigError::Invalid("interaction.click_tolerance is negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TimelineConfig::from_json_str(
            r#"{ "pixels_per_second": 50, "interaction": { "zoom_sensitivity": 0.02 } }"#,
        )
        .unwrap();

        assert_eq!(config.pixels_per_second, 50.0);
        assert_eq!(config.visible_width, 1000.0);
        assert_eq!(config.interaction.zoom_sensitivity, 0.02);
        assert_eq!(config.interaction.min_zoom_ratio, 0.01);
        assert_eq!(config.layer, LayerParams::default());
        assert_eq!(config.selected_class, "selected");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TimelineConfig::from_json_str(r#"{ "visible_width": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = TimelineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let config = TimelineConfig::load("/nonexistent/wavelane/config.json");
        assert_eq!(config, TimelineConfig::default());
        assert!(matches!(
            TimelineConfig::try_load("/nonexistent/wavelane/config.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("wavelane-config-{}.json", uuid::Uuid::new_v4()));
        let mut config = TimelineConfig::default();
        config.maintain_visible_duration = true;
        config.interaction.clamp_zoomed_out_offset = true;

        config.save(&path).unwrap();
        assert_eq!(TimelineConfig::try_load(&path).unwrap(), config);
        std::fs::remove_file(&path).unwrap();
    }
}
