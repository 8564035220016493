//! Candle Canvas - OHLC candlestick chart rendering
//!
//! [`charts::ChartRenderer`] maps a sequence of [`data::PriceBar`]s onto any
//! [`charts::DrawSurface`]: a pixel image ([`charts::RasterSurface`]) or a
//! recorded command list ([`charts::DisplayList`]).

pub mod charts;
pub mod config;
pub mod data;

pub use charts::{ChartRenderer, DrawSurface, RasterSurface};
pub use config::ChartConfig;
pub use data::PriceBar;
