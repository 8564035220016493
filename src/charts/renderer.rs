//! Candlestick Chart Renderer
//! Paints a sequence of OHLC bars onto a [`DrawSurface`].
//!
//! Layers, back to front:
//! 1. Horizontal price grid with price labels
//! 2. Vertical time grid with time labels
//! 3. Candles in sequence order (wick, body, body outline)
//! 4. Chart border
//! 5. Title

use crate::charts::scale::{ChartArea, ChartGeometry, PriceScale, TimeScale};
use crate::charts::surface::{Color, DrawSurface, Point, Rect, Stroke, TextAlign, TextStyle};
use crate::config::ChartConfig;
use crate::data::{Direction, PriceBar};

// Colors (RGBA)
const GRID_RGB: (u8, u8, u8) = (200, 200, 200);
const LABEL: Color = Color::rgba8(200, 200, 200, 204);
const FRAME: Color = Color::rgba8(200, 200, 200, 128);
const TITLE: Color = Color::WHITE;

const LABEL_FONT_SIZE: f64 = 10.0;
const TITLE_FONT_SIZE: f64 = 12.0;

/// Stroke and fill colors for one candle direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandlePalette {
    pub wick: Color,
    pub body: Color,
    pub border: Color,
}

pub const UP_CANDLE: CandlePalette = CandlePalette {
    wick: Color::rgb(0, 200, 0),
    body: Color::rgba8(0, 200, 0, 204),
    border: Color::rgb(0, 150, 0),
};

pub const DOWN_CANDLE: CandlePalette = CandlePalette {
    wick: Color::rgb(255, 0, 0),
    body: Color::rgba8(255, 0, 0, 204),
    border: Color::rgb(200, 0, 0),
};

impl CandlePalette {
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => UP_CANDLE,
            Direction::Down => DOWN_CANDLE,
        }
    }
}

/// Stateless candlestick renderer. Each [`render`](ChartRenderer::render) call
/// fully repaints the surface from the bars passed in.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Geometry for a surface of `width` x `height` logical pixels.
    pub fn geometry(&self, width: f64, height: f64, bars: &[PriceBar]) -> Option<ChartGeometry> {
        ChartGeometry::compute(width, height, bars, &self.config)
    }

    /// Repaint `surface` with `bars`.
    ///
    /// Never fails: an unsized surface is left untouched, fewer than two bars
    /// skip the candles and time axis, and flat prices get a synthetic span.
    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S, bars: &[PriceBar]) {
        let (width, height) = surface.logical_size();
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::debug!("Skipping render: surface not sized ({width}x{height})");
            return;
        }

        let ratio = surface.pixel_ratio();
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        surface.set_scale(ratio);
        surface.clear(Rect::new(0.0, 0.0, width, height));

        let Some(geometry) = self.geometry(width, height, bars) else {
            log::debug!("Skipping render: {width}x{height} leaves no room inside padding");
            return;
        };
        let area = geometry.area;

        if let Some(prices) = &geometry.prices {
            self.draw_price_grid(surface, &area, prices);
        }

        match (&geometry.prices, &geometry.times) {
            (Some(prices), Some(times)) => {
                self.draw_time_grid(surface, &area, times, bars);
                Self::draw_candles(surface, &area, prices, times, geometry.candle_width, bars);
            }
            _ => log::debug!("{} bar(s) to plot, skipping candles and time axis", bars.len()),
        }

        self.draw_frame(surface, &area);
    }

    fn grid_stroke(&self) -> Stroke {
        let (r, g, b) = GRID_RGB;
        Stroke::hairline(Color::rgba(r, g, b, self.config.grid_line_alpha))
    }

    fn draw_price_grid<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        area: &ChartArea,
        prices: &PriceScale,
    ) {
        let stroke = self.grid_stroke();
        let label_style = TextStyle::new(LABEL_FONT_SIZE, LABEL).align(TextAlign::Right);

        for price in prices.grid_prices() {
            let y = prices.y(price, area);
            surface.draw_line(Point::new(area.left, y), Point::new(area.right(), y), stroke);

            let label = format!("{}{:.2}", self.config.currency_symbol, price);
            surface.draw_text(&label, Point::new(area.left - 5.0, y + 3.0), &label_style);
        }
    }

    fn draw_time_grid<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        area: &ChartArea,
        times: &TimeScale,
        bars: &[PriceBar],
    ) {
        let stroke = self.grid_stroke();
        let label_style = TextStyle::new(LABEL_FONT_SIZE, LABEL).align(TextAlign::Center);

        for i in times.grid_indices(self.config.grid_column_count) {
            let x = times.x(i, area);
            surface.draw_line(Point::new(x, area.top), Point::new(x, area.bottom()), stroke);
            surface.draw_text(
                &bars[i].time,
                Point::new(x, area.bottom() + 15.0),
                &label_style,
            );
        }
    }

    fn draw_candles<S: DrawSurface + ?Sized>(
        surface: &mut S,
        area: &ChartArea,
        prices: &PriceScale,
        times: &TimeScale,
        candle_width: f64,
        bars: &[PriceBar],
    ) {
        for (i, bar) in bars.iter().enumerate() {
            let x = times.x(i, area);
            let open = prices.y(bar.open, area);
            let close = prices.y(bar.close, area);
            let high = prices.y(bar.high, area);
            let low = prices.y(bar.low, area);

            let direction = bar.direction();
            let palette = CandlePalette::for_direction(direction);

            let (top, bottom) = (Point::new(x, high), Point::new(x, low));
            if top.is_finite() && bottom.is_finite() {
                surface.draw_line(top, bottom, Stroke::hairline(palette.wick));
            }

            let body = Rect::new(
                x - candle_width / 2.0,
                if direction.is_up() { close } else { open },
                candle_width,
                (close - open).abs(),
            );
            if !body.is_finite() {
                continue;
            }
            surface.fill_rect(body, palette.body);
            surface.stroke_rect(body, Stroke::hairline(palette.border));
        }
    }

    fn draw_frame<S: DrawSurface + ?Sized>(&self, surface: &mut S, area: &ChartArea) {
        surface.stroke_rect(area.rect(), Stroke::hairline(FRAME));
        surface.draw_text(
            &self.config.title,
            Point::new(area.left, area.top - 5.0),
            &TextStyle::new(TITLE_FONT_SIZE, TITLE).bold(),
        );
    }
}
