// Tunables for sizing, brush, strokes, resize debounce and the demo animation.
// Every field has a default, so a config file only needs the keys it changes.
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Container widths below this are treated as this (layout pixels).
    pub min_container_width: f32,
    /// Device pixel ratios above this are capped.
    pub max_device_pixel_ratio: f32,
    /// Aspect used when the base image reports no usable size.
    pub fallback_aspect: f32,
    pub brush_min_radius: f32,
    pub brush_max_radius: f32,
    /// Brush radius as a fraction of the surface pixel width.
    pub brush_width_factor: f32,
    /// Fraction of the radius painted fully opaque before the falloff starts.
    pub brush_core_fraction: f32,
    /// Stroke interpolation step as a fraction of the brush radius.
    pub stroke_step_factor: f32,
    pub stroke_min_step: f32,
    /// Quiet period before a burst of resize notifications is applied.
    pub resize_debounce_ms: u64,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub enabled: bool,
    pub duration_ms: u64,
    pub passes: u32,
    /// Horizontal inset of the left/right waypoints as a fraction of the width.
    pub margin: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            min_container_width: 200.0,
            max_device_pixel_ratio: 2.0,
            fallback_aspect: 16.0 / 9.0,
            brush_min_radius: 24.0,
            brush_max_radius: 220.0,
            brush_width_factor: 0.06,
            brush_core_fraction: 0.15,
            stroke_step_factor: 0.2,
            stroke_min_step: 4.0,
            resize_debounce_ms: 100,
            demo: DemoConfig::default(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { enabled: true, duration_ms: 5000, passes: 3, margin: 0.06 }
    }
}

impl RevealConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let cfg = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded reveal config");
        Ok(cfg)
    }
}
