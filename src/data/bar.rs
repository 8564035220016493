//! Price Bar Module
//! OHLC bar record supplied to the chart renderer.

use serde::{Deserialize, Serialize};

/// One sampled trading interval.
///
/// `low <= min(open, close)` and `high >= max(open, close)` are assumed but
/// never checked; a malformed bar renders oddly but never panics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Opaque display label. Only its position in the sequence matters.
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Accepted but not rendered.
    #[serde(default)]
    pub volume: u64,
}

impl PriceBar {
    pub fn new(time: impl Into<String>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time: time.into(),
            open,
            high,
            low,
            close,
            volume: 0,
        }
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = volume;
        self
    }

    pub fn direction(&self) -> Direction {
        Direction::of(self)
    }
}

/// Candle direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `close >= open` is up; a flat bar counts as up.
    pub fn of(bar: &PriceBar) -> Self {
        if bar.close >= bar.open {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }
}
