//! Raster Surface
//! Pixel backend for the chart renderer: an RGBA image with alpha blending,
//! TrueType text and PNG export.
//!
//! The backing store is `ceil(width * ratio)` x `ceil(height * ratio)` device
//! pixels. Every chart primitive is axis-aligned, so lines and rectangle
//! outlines are rasterized as filled pixel spans.

use crate::charts::surface::{Color, DrawSurface, Point, Rect, Stroke, TextAlign, TextStyle};
use image::{ImageBuffer, ImageFormat, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, Blend};
use imageproc::rect::Rect as PixelRect;
use rusttype::{Font, Scale};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Common system font locations probed when no font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to read font {path}: {source}")]
    FontIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Not a usable TrueType font: {0}")]
    InvalidFont(PathBuf),
}

/// Load the configured font, or the first system font that parses.
///
/// An explicit `path` that cannot be used is an error; failing to find any
/// system font is not, text is then simply not drawn.
pub fn load_font(path: Option<&Path>) -> Result<Option<Font<'static>>, RasterError> {
    if let Some(path) = path {
        let bytes = std::fs::read(path).map_err(|source| RasterError::FontIo {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| RasterError::InvalidFont(path.to_path_buf()))?;
        log::info!("Using font {}", path.display());
        return Ok(Some(font));
    }

    for candidate in FONT_CANDIDATES {
        if let Some(font) = std::fs::read(candidate).ok().and_then(Font::try_from_vec) {
            log::debug!("Using system font {candidate}");
            return Ok(Some(font));
        }
    }

    log::warn!("No TrueType font found; chart labels will not be drawn");
    Ok(None)
}

/// rusttype scales by ascent-to-descent height, CSS `font-size` by the em.
fn pixel_height_for_em(em_px: f32, ascent: f32, descent: f32, units_per_em: f32) -> f32 {
    let height = ascent - descent;
    if units_per_em > 0.0 && height > 0.0 {
        em_px * height / units_per_em
    } else {
        em_px
    }
}

fn em_scale(font: &Font<'static>, em_px: f32) -> Scale {
    let metrics = font.v_metrics_unscaled();
    Scale::uniform(pixel_height_for_em(
        em_px,
        metrics.ascent,
        metrics.descent,
        f32::from(font.units_per_em()),
    ))
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Rgba([color.r, color.g, color.b, color.a])
    }
}

/// RGBA pixel surface.
pub struct RasterSurface {
    width: f64,
    height: f64,
    ratio: f64,
    scale: f64,
    background: Rgba<u8>,
    canvas: Blend<RgbaImage>,
    font: Option<Font<'static>>,
    warned_missing_font: bool,
}

impl RasterSurface {
    /// Surface of `width` x `height` logical pixels at `ratio` device pixels each.
    pub fn new(width: f64, height: f64, ratio: f64) -> Self {
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        let device = |logical: f64| {
            if logical.is_finite() && logical > 0.0 {
                (logical * ratio).ceil() as u32
            } else {
                0
            }
        };

        Self {
            width,
            height,
            ratio,
            scale: 1.0,
            background: Rgba([0, 0, 0, 0]),
            canvas: Blend(ImageBuffer::new(device(width), device(height))),
            font: None,
            warned_missing_font: false,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color.into();
        self
    }

    pub fn with_font(mut self, font: Option<Font<'static>>) -> Self {
        self.font = font;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas.0
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas.0
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>, RasterError> {
        let mut bytes = Vec::new();
        self.canvas
            .0
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RasterError> {
        self.canvas.0.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    fn device(&self, logical: f64) -> f64 {
        logical * self.scale
    }

    fn thickness(&self, stroke: &Stroke) -> i64 {
        (stroke.width * self.scale).round().max(1.0) as i64
    }

    /// Blend `color` over the device-pixel span `[x0, x1) x [y0, y1)`, clipped.
    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
        let (w, h) = self.canvas.0.dimensions();
        let (x0, x1) = (x0.clamp(0, w as i64), x1.clamp(0, w as i64));
        let (y0, y1) = (y0.clamp(0, h as i64), y1.clamp(0, h as i64));
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        draw_filled_rect_mut(
            &mut self.canvas,
            PixelRect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32),
            color,
        );
    }

    fn text_width(font: &Font<'static>, scale: Scale, text: &str) -> f32 {
        font.layout(text, scale, rusttype::point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn blit_text(
        &mut self,
        font: &Font<'static>,
        scale: Scale,
        text: &str,
        x: f32,
        y: f32,
        color: Rgba<u8>,
    ) {
        let img = &mut self.canvas.0;
        let (w, h) = img.dimensions();
        for glyph in font.layout(text, scale, rusttype::point(x, y)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    let px = bb.min.x + gx as i32;
                    let py = bb.min.y + gy as i32;
                    if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h {
                        return;
                    }
                    let alpha = (color[3] as f32 * coverage).round() as u8;
                    if alpha > 0 {
                        img.get_pixel_mut(px as u32, py as u32)
                            .blend(&Rgba([color[0], color[1], color[2], alpha]));
                    }
                });
            }
        }
    }
}

impl DrawSurface for RasterSurface {
    fn logical_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn set_scale(&mut self, factor: f64) {
        self.scale = factor;
    }

    fn clear(&mut self, rect: Rect) {
        let (w, h) = self.canvas.0.dimensions();
        let clamp_x = |v: f64| (v.round().max(0.0) as u32).min(w);
        let clamp_y = |v: f64| (v.round().max(0.0) as u32).min(h);
        let (x0, x1) = (clamp_x(self.device(rect.x)), clamp_x(self.device(rect.right())));
        let (y0, y1) = (clamp_y(self.device(rect.y)), clamp_y(self.device(rect.bottom())));

        let background = self.background;
        for y in y0..y1 {
            for x in x0..x1 {
                self.canvas.0.put_pixel(x, y, background);
            }
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        if !(from.is_finite() && to.is_finite()) {
            return;
        }
        let color: Rgba<u8> = stroke.color.into();
        let t = self.thickness(&stroke);
        let (fx, fy) = (self.device(from.x), self.device(from.y));
        let (tx, ty) = (self.device(to.x), self.device(to.y));

        if fx == tx {
            let x0 = (fx - t as f64 / 2.0).round() as i64;
            let (y0, y1) = (fy.min(ty).round() as i64, fy.max(ty).round() as i64);
            self.fill_span(x0, y0, x0 + t, y1, color);
        } else if fy == ty {
            let y0 = (fy - t as f64 / 2.0).round() as i64;
            let (x0, x1) = (fx.min(tx).round() as i64, fx.max(tx).round() as i64);
            self.fill_span(x0, y0, x1, y0 + t, color);
        } else {
            for offset in 0..t {
                let o = offset as f32 - (t - 1) as f32 / 2.0;
                draw_line_segment_mut(
                    &mut self.canvas,
                    (fx as f32 + o, fy as f32),
                    (tx as f32 + o, ty as f32),
                    color,
                );
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if !rect.is_finite() {
            return;
        }
        let x0 = self.device(rect.x).round() as i64;
        let x1 = self.device(rect.right()).round() as i64;
        let y0 = self.device(rect.y).round() as i64;
        let y1 = self.device(rect.bottom()).round() as i64;
        self.fill_span(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1), color.into());
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        if !rect.is_finite() {
            return;
        }
        let color: Rgba<u8> = stroke.color.into();
        let t = self.thickness(&stroke);
        let half = t / 2;
        let x0 = self.device(rect.x.min(rect.right())).round() as i64;
        let x1 = self.device(rect.x.max(rect.right())).round() as i64;
        let y0 = self.device(rect.y.min(rect.bottom())).round() as i64;
        let y1 = self.device(rect.y.max(rect.bottom())).round() as i64;

        // Outline bands would overlap: the whole thing is one solid span.
        if x1 - x0 <= t || y1 - y0 <= t {
            self.fill_span(x0 - half, y0 - half, x1 - half + t, y1 - half + t, color);
            return;
        }

        self.fill_span(x0 - half, y0 - half, x1 - half + t, y0 - half + t, color);
        self.fill_span(x0 - half, y1 - half, x1 - half + t, y1 - half + t, color);
        self.fill_span(x0 - half, y0 - half + t, x0 - half + t, y1 - half, color);
        self.fill_span(x1 - half, y0 - half + t, x1 - half + t, y1 - half, color);
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let Some(font) = self.font.clone() else {
            if !self.warned_missing_font {
                log::warn!("No font loaded, skipping text such as {text:?}");
                self.warned_missing_font = true;
            }
            return;
        };
        if !at.is_finite() || text.is_empty() {
            return;
        }

        let scale = em_scale(&font, (style.size * self.scale) as f32);
        let width = Self::text_width(&font, scale, text);
        let x = self.device(at.x) as f32
            - match style.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => width / 2.0,
                TextAlign::Right => width,
            };
        let y = self.device(at.y) as f32;
        let color: Rgba<u8> = style.color.into();

        self.blit_text(&font, scale, text, x, y, color);
        if style.bold {
            // Overstrike one device pixel to the right.
            let offset = self.scale.round().max(1.0) as f32;
            self.blit_text(&font, scale, text, x + offset, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::renderer::{ChartRenderer, UP_CANDLE};
    use crate::data::PriceBar;

    const BG: Color = Color::rgb(0x13, 0x17, 0x22);

    fn surface(width: f64, height: f64, ratio: f64) -> RasterSurface {
        let mut surface = RasterSurface::new(width, height, ratio).with_background(BG);
        surface.set_scale(ratio);
        surface.clear(Rect::new(0.0, 0.0, width, height));
        surface
    }

    #[test]
    fn text_size_is_an_em_size() {
        // DejaVu Sans: ascent 1901, descent -483, 2048 units per em
        let height = pixel_height_for_em(10.0, 1901.0, -483.0, 2048.0);
        assert!((height - 11.640625).abs() < 1e-5);
        assert_eq!(pixel_height_for_em(10.0, 0.0, 0.0, 0.0), 10.0);
    }

    #[test]
    fn backing_store_follows_pixel_ratio() {
        let surface = RasterSurface::new(400.5, 200.0, 2.0);
        assert_eq!(surface.image().dimensions(), (801, 400));
        assert_eq!(RasterSurface::new(0.0, 10.0, 2.0).image().dimensions(), (0, 20));
    }

    #[test]
    fn clear_paints_background() {
        let surface = surface(20.0, 10.0, 1.0);
        assert!(surface.image().pixels().all(|p| *p == Rgba([0x13, 0x17, 0x22, 255])));
    }

    #[test]
    fn fill_rect_scales_to_device_pixels() {
        let mut surface = surface(20.0, 10.0, 2.0);
        surface.fill_rect(Rect::new(2.0, 2.0, 3.0, 1.0), Color::WHITE);
        let img = surface.image();
        assert_eq!(*img.get_pixel(4, 4), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(9, 5), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(10, 4), Rgba([0x13, 0x17, 0x22, 255]));
        assert_eq!(*img.get_pixel(4, 6), Rgba([0x13, 0x17, 0x22, 255]));
    }

    #[test]
    fn translucent_fill_blends_over_background() {
        let mut surface = surface(10.0, 10.0, 1.0);
        surface.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::rgba8(255, 0, 0, 128));
        let px = surface.image().get_pixel(1, 1);
        assert!(px[0] > 0x13 && px[0] < 255);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn flat_rect_outline_is_a_line() {
        let mut surface = surface(20.0, 10.0, 1.0);
        surface.stroke_rect(Rect::new(2.0, 5.0, 10.0, 0.0), Stroke::hairline(Color::WHITE));
        let img = surface.image();
        assert_eq!(*img.get_pixel(6, 5), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(6, 3), Rgba([0x13, 0x17, 0x22, 255]));
    }

    #[test]
    fn outline_leaves_interior_untouched() {
        let mut surface = surface(20.0, 20.0, 1.0);
        surface.stroke_rect(Rect::new(2.0, 2.0, 10.0, 10.0), Stroke::hairline(Color::WHITE));
        let img = surface.image();
        assert_eq!(*img.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(12, 7), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(7, 7), Rgba([0x13, 0x17, 0x22, 255]));
    }

    #[test]
    fn drawing_outside_is_clipped() {
        let mut surface = surface(10.0, 10.0, 1.0);
        surface.fill_rect(Rect::new(-50.0, -50.0, 1e9, 1e9), Color::WHITE);
        surface.draw_line(
            Point::new(5.0, -1e12),
            Point::new(5.0, 1e12),
            Stroke::hairline(Color::WHITE),
        );
        assert!(surface.image().pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn text_without_font_is_skipped() {
        let mut surface = surface(50.0, 20.0, 1.0);
        surface.draw_text("₹100.00", Point::new(10.0, 10.0), &TextStyle::new(10.0, Color::WHITE));
        assert!(surface.image().pixels().all(|p| *p == Rgba([0x13, 0x17, 0x22, 255])));
    }

    #[test]
    fn renders_candles_into_pixels() {
        let bars = vec![
            PriceBar::new("9:00", 100.0, 130.0, 95.0, 125.0),
            PriceBar::new("9:10", 125.0, 128.0, 90.0, 92.0),
        ];
        let mut surface = RasterSurface::new(400.0, 300.0, 1.0).with_background(BG);
        ChartRenderer::default().render(&mut surface, &bars);

        // Body of the first (up) candle straddles the left chart edge.
        let geometry = ChartRenderer::default().geometry(400.0, 300.0, &bars).unwrap();
        let prices = geometry.prices.unwrap();
        let mid = (prices.y(100.0, &geometry.area) + prices.y(125.0, &geometry.area)) / 2.0;
        let px = surface.image().get_pixel(geometry.area.left as u32 + 5, mid as u32);
        assert!(px[1] > px[0] && px[1] > px[2], "expected green body, got {px:?}");
        assert_eq!(UP_CANDLE.body.g, 200);
    }

    #[test]
    fn png_export_has_signature() {
        let surface = surface(8.0, 8.0, 1.0);
        let bytes = surface.to_png_bytes().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn explicit_missing_font_is_an_error() {
        let err = load_font(Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert!(matches!(err, RasterError::FontIo { .. }));
    }
}
