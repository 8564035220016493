//! Charts module - Candlestick rendering

mod display_list;
mod raster;
mod renderer;
mod scale;
mod surface;

pub use display_list::{DisplayList, DrawCommand};
pub use raster::{load_font, RasterError, RasterSurface};
pub use renderer::{CandlePalette, ChartRenderer, DOWN_CANDLE, UP_CANDLE};
pub use scale::{
    candle_width, price_step, time_step, ChartArea, ChartGeometry, PriceScale, TimeScale,
};
pub use surface::{Color, DrawSurface, Point, Rect, Stroke, TextAlign, TextStyle};
