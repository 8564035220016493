//! Chart Configuration Module
//! Layout constants and styling knobs, loadable from a JSON file.

use crate::charts::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Space reserved around the plotting area, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 50.0,
            bottom: 30.0,
            left: 60.0,
        }
    }
}

/// Renderer and viewer settings. Every field has a default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub padding: Padding,
    /// Alpha of grid lines, `0.0..=1.0`.
    pub grid_line_alpha: f32,
    /// Candle body width as a share of one bar slot.
    pub candle_width_ratio: f64,
    /// Blank margin above and below the price range, as a share of the range.
    pub price_padding_ratio: f64,
    /// Approximate number of vertical grid lines.
    pub grid_column_count: usize,
    pub currency_symbol: String,
    pub title: String,
    /// Price span substituted when every bar has the same price.
    pub degenerate_span: f64,
    /// Background fill, `#rrggbb` or `#rrggbbaa`.
    pub background: String,
    pub font_path: Option<PathBuf>,
    /// Seconds between simulated ticks in the viewer.
    pub tick_interval_secs: u64,
    /// Number of bars in a simulated session.
    pub window_len: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            grid_line_alpha: 0.2,
            candle_width_ratio: 0.8,
            price_padding_ratio: 0.1,
            grid_column_count: 6,
            currency_symbol: "₹".to_string(),
            title: "TradingView Style Candlestick Chart".to_string(),
            degenerate_span: 1.0,
            background: "#131722".to_string(),
            font_path: None,
            tick_interval_secs: 5,
            window_len: 30,
        }
    }
}

impl ChartConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded chart config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        let p = &self.padding;
        if [p.top, p.right, p.bottom, p.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(invalid("padding", "must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&self.grid_line_alpha) {
            return Err(invalid("grid_line_alpha", "must be within 0..=1"));
        }
        if !(self.candle_width_ratio > 0.0 && self.candle_width_ratio <= 1.0) {
            return Err(invalid("candle_width_ratio", "must be within (0, 1]"));
        }
        if !(self.price_padding_ratio >= 0.0 && self.price_padding_ratio.is_finite()) {
            return Err(invalid("price_padding_ratio", "must be finite and non-negative"));
        }
        if self.grid_column_count == 0 {
            return Err(invalid("grid_column_count", "must be at least 1"));
        }
        if !(self.degenerate_span > 0.0 && self.degenerate_span.is_finite()) {
            return Err(invalid("degenerate_span", "must be finite and positive"));
        }
        if Color::from_hex(&self.background).is_none() {
            return Err(invalid("background", "expected #rrggbb or #rrggbbaa"));
        }
        if self.window_len < 2 {
            return Err(invalid("window_len", "must be at least 2"));
        }
        Ok(())
    }

    pub fn background_color(&self) -> Color {
        Color::from_hex(&self.background).unwrap_or(Color::rgb(0x13, 0x17, 0x22))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_layout() {
        let config = ChartConfig::default();
        assert_eq!(config.padding.top, 20.0);
        assert_eq!(config.padding.right, 50.0);
        assert_eq!(config.padding.bottom, 30.0);
        assert_eq!(config.padding.left, 60.0);
        assert_eq!(config.candle_width_ratio, 0.8);
        assert_eq!(config.price_padding_ratio, 0.1);
        assert_eq!(config.grid_column_count, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ChartConfig::from_json(r#"{"padding":{"left":80},"title":"NIFTY"}"#).unwrap();
        assert_eq!(config.padding.left, 80.0);
        assert_eq!(config.padding.top, 20.0);
        assert_eq!(config.title, "NIFTY");
        assert_eq!(config.grid_column_count, 6);
    }

    #[test]
    fn rejects_out_of_range_ratio() {
        let err = ChartConfig::from_json(r#"{"candle_width_ratio":1.5}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "candle_width_ratio",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_columns_and_bad_background() {
        assert!(ChartConfig::from_json(r#"{"grid_column_count":0}"#).is_err());
        assert!(ChartConfig::from_json(r##"{"background":"#12"}"##).is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            ChartConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
