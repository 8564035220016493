//! Chart Scale Module
//! Data space to pixel space mapping: chart area, price axis, time axis and
//! grid spacing. Pure functions of the surface size, bars and config.

use crate::charts::surface::Rect;
use crate::config::{ChartConfig, Padding};
use crate::data::PriceBar;

/// Hard cap on horizontal grid lines, so absurd price ranges cannot stall a frame.
const MAX_GRID_LINES: usize = 10_000;

/// Plotting rectangle left after padding is reserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ChartArea {
    /// `None` when the padding leaves no room to plot.
    pub fn from_size(width: f64, height: f64, padding: &Padding) -> Option<Self> {
        let chart_width = width - padding.left - padding.right;
        let chart_height = height - padding.top - padding.bottom;
        if !(chart_width > 0.0 && chart_height > 0.0) {
            return None;
        }
        Some(Self {
            left: padding.left,
            top: padding.top,
            width: chart_width,
            height: chart_height,
        })
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// Vertical mapping from price to pixel row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub min: f64,
    pub max: f64,
    pub pad: f64,
}

impl PriceScale {
    /// Scale spanning every high and low, widened by `padding_ratio` of the range
    /// on both ends. When all prices are equal, a range of `degenerate_span`
    /// centered on that price is substituted, grown as needed so it survives
    /// rounding at large magnitudes. Non-finite prices are ignored; `None` if
    /// nothing finite is left or the span overflows.
    pub fn from_bars(bars: &[PriceBar], padding_ratio: f64, degenerate_span: f64) -> Option<Self> {
        let (mut min, mut max) = bars
            .iter()
            .flat_map(|bar| [bar.high, bar.low])
            .filter(|p| p.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            });

        if min > max {
            return None;
        }

        if max - min == 0.0 {
            let span = if degenerate_span.is_finite() && degenerate_span > 0.0 {
                degenerate_span
            } else {
                1.0
            };
            // At least a few ulps of the price, or `min - half` rounds back to `min`.
            let half = (span / 2.0).max(min.abs() * 4.0 * f64::EPSILON);
            min -= half;
            max += half;
        }

        let ratio = if padding_ratio.is_finite() {
            padding_ratio.max(0.0)
        } else {
            0.0
        };
        let scale = Self {
            min,
            max,
            pad: (max - min) * ratio,
        };

        let span = scale.upper() - scale.lower();
        (span > 0.0 && span.is_finite()).then_some(scale)
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn lower(&self) -> f64 {
        self.min - self.pad
    }

    pub fn upper(&self) -> f64 {
        self.max + self.pad
    }

    /// Pixel row for `price`; higher prices map to smaller `y`.
    pub fn y(&self, price: f64, area: &ChartArea) -> f64 {
        let span = self.upper() - self.lower();
        area.top + area.height - ((price - self.lower()) / span) * area.height
    }

    /// Prices at which horizontal grid lines are drawn: every `price_step`
    /// from the largest multiple at or below `min` up to `max + step`.
    pub fn grid_prices(&self) -> Vec<f64> {
        let step = price_step(self.range());
        let first = (self.min / step).floor() * step;
        let last = self.max + step;
        let count = (((last - first) / step) + 1e-9).floor() as usize + 1;
        (0..count.min(MAX_GRID_LINES))
            .map(|k| first + k as f64 * step)
            .collect()
    }
}

/// Horizontal mapping from bar index to pixel column. Needs two or more bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeScale {
    count: usize,
}

impl TimeScale {
    pub fn new(count: usize) -> Option<Self> {
        (count >= 2).then_some(Self { count })
    }

    pub fn x(&self, index: usize, area: &ChartArea) -> f64 {
        area.left + (index as f64 / (self.count - 1) as f64) * area.width
    }

    /// Bar indices that get a vertical grid line and time label.
    pub fn grid_indices(&self, columns: usize) -> impl Iterator<Item = usize> {
        (0..self.count).step_by(time_step(self.count, columns))
    }
}

/// Three-tier grid step on the price range.
pub fn price_step(range: f64) -> f64 {
    if range > 100.0 {
        20.0
    } else if range > 50.0 {
        10.0
    } else {
        5.0
    }
}

/// Index interval between vertical grid lines, `ceil(n / columns)`, at least 1.
pub fn time_step(count: usize, columns: usize) -> usize {
    count.div_ceil(columns.max(1)).max(1)
}

/// Candle body width for `count` bars sharing `chart_width`.
pub fn candle_width(chart_width: f64, count: usize, ratio: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (chart_width / count as f64) * ratio
}

/// Everything the renderer needs to place a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub area: ChartArea,
    /// `None` when no bar carries a finite price.
    pub prices: Option<PriceScale>,
    /// `None` for fewer than two bars.
    pub times: Option<TimeScale>,
    pub candle_width: f64,
}

impl ChartGeometry {
    pub fn compute(
        width: f64,
        height: f64,
        bars: &[PriceBar],
        config: &ChartConfig,
    ) -> Option<Self> {
        let area = ChartArea::from_size(width, height, &config.padding)?;
        Some(Self {
            area,
            prices: PriceScale::from_bars(
                bars,
                config.price_padding_ratio,
                config.degenerate_span,
            ),
            times: TimeScale::new(bars.len()),
            candle_width: candle_width(area.width, bars.len(), config.candle_width_ratio),
        })
    }
}
