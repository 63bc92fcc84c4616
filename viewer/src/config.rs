//! Viewer configuration: endpoint, reconnect policy, and zoom behavior.
//!
//! Every field has a default, so hosts may deserialize a partial JSON object
//! (the browser host) or build the struct from CLI flags (the `wsviz` binary).
//! Call [`ViewerConfig::validate`] before handing a config to the engine.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_RECONNECT_DELAY_MS, DEFAULT_URL, DEFAULT_VIEW_SCALE_DIVISOR,
    DEFAULT_ZOOM_SENSITIVITY,
};

/// Error returned by [`ViewerConfig::validate`] and [`ViewerConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("socket url must not be empty")]
    EmptyUrl,
    #[error("reconnect delay must be positive")]
    ZeroReconnectDelay,
    #[error("zoom bounds must satisfy 0 < min <= max, got [{min}, {max}]")]
    InvalidZoomBounds { min: f64, max: f64 },
    #[error("zoom sensitivity must be positive, got {0}")]
    InvalidSensitivity(f64),
    #[error("view scale divisor must be positive, got {0}")]
    InvalidScaleDivisor(f64),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recognized viewer options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Socket endpoint of the simulation's state stream.
    pub url: String,
    /// Period of the reconnect timer while disconnected.
    pub reconnect_delay_ms: u32,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Fractional zoom change per wheel pixel.
    pub zoom_sensitivity: f64,
    /// The reset view scale is `min(width, height) / view_scale_divisor`.
    pub view_scale_divisor: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            view_scale_divisor: DEFAULT_VIEW_SCALE_DIVISOR,
        }
    }
}

impl ViewerConfig {
    /// Parse a (possibly partial) JSON object and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON, or any error from
    /// [`ViewerConfig::validate`].
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    /// Check invariants the engine relies on, returning the config unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ZeroReconnectDelay);
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale && self.max_scale.is_finite()) {
            return Err(ConfigError::InvalidZoomBounds { min: self.min_scale, max: self.max_scale });
        }
        if !(self.zoom_sensitivity > 0.0 && self.zoom_sensitivity.is_finite()) {
            return Err(ConfigError::InvalidSensitivity(self.zoom_sensitivity));
        }
        if !(self.view_scale_divisor > 0.0 && self.view_scale_divisor.is_finite()) {
            return Err(ConfigError::InvalidScaleDivisor(self.view_scale_divisor));
        }
        Ok(self)
    }
}
