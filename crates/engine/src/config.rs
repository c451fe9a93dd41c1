use serde::Deserialize;

use crate::error::{EngineError, Result};

/// Tunables for the timeline core.
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides.
///
/// # Example
/// ```
/// use clipdeck_engine::EditorConfig;
///
/// let config = EditorConfig::from_json_str(r#"{ "initial_zoom": 4 }"#).expect("valid");
/// assert_eq!(config.initial_zoom, 4);
/// assert_eq!(config.zoom_max, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub zoom_min: u8,
    pub zoom_max: u8,
    pub initial_zoom: u8,
    pub base_pixels_per_second: f64,
    pub pixels_per_second_slope: f64,
    /// Narrowest clip, in pixels, a trim may produce.
    pub min_clip_width_px: f64,
    /// Ruler length used until the transport reports a media duration.
    pub default_visible_duration: f64,
    /// Duration given to imported media whose length is unknown.
    pub default_media_duration: f64,
    pub text_clip_duration: f64,
    /// Surface x coordinate of the track origin.
    pub track_left_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_min: 1,
            zoom_max: 10,
            initial_zoom: 1,
            base_pixels_per_second: 20.0,
            pixels_per_second_slope: 15.0,
            min_clip_width_px: 30.0,
            default_visible_duration: 60.0,
            default_media_duration: 5.0,
            text_clip_duration: 5.0,
            track_left_px: 0.0,
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks bounds and constants that the mapper and store rely on.
    pub fn validate(&self) -> Result<()> {
        if self.zoom_min == 0 || self.zoom_min > self.zoom_max {
            return Err(invalid(format!(
                "zoom bounds {}..={} are not a non-empty positive range",
                self.zoom_min, self.zoom_max
            )));
        }
        if !(self.zoom_min..=self.zoom_max).contains(&self.initial_zoom) {
            return Err(invalid(format!(
                "initial zoom {} is outside {}..={}",
                self.initial_zoom, self.zoom_min, self.zoom_max
            )));
        }
        if !is_positive(self.pixels_per_second_slope) || !(self.base_pixels_per_second >= 0.0) {
            return Err(invalid(String::from(
                "pixels-per-second formula must be increasing and non-negative",
            )));
        }

        let positive_fields = [
            ("min_clip_width_px", self.min_clip_width_px),
            ("default_visible_duration", self.default_visible_duration),
            ("default_media_duration", self.default_media_duration),
            ("text_clip_duration", self.text_clip_duration),
        ];
        for (name, value) in positive_fields {
            if !is_positive(value) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.track_left_px.is_finite() {
            return Err(invalid(String::from("track_left_px must be finite")));
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(reason: String) -> EngineError {
    EngineError::InvalidConfig { reason }
}
