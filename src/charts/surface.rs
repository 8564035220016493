//! Drawing Surface Module
//! Minimal immediate-mode drawing interface the chart renderer targets.
//!
//! All coordinates are logical (device-independent) pixels. A surface maps
//! them to its backing store through the scale set with [`DrawSurface::set_scale`].

/// A point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle in logical pixels, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// RGBA color, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from a CSS-style `rgba()` quadruple, alpha in `0.0..=1.0`.
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }
}

/// Line style: color plus width in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    /// A 1px stroke.
    pub const fn hairline(color: Color) -> Self {
        Self { color, width: 1.0 }
    }
}

/// Horizontal anchoring of text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text style. The anchor point passed to `draw_text` is on the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub align: TextAlign,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: f64, color: Color) -> Self {
        Self {
            size,
            bold: false,
            align: TextAlign::Left,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// Immediate-mode drawing target.
///
/// Implementors own their backing store; the renderer only issues commands and
/// never resizes the surface.
pub trait DrawSurface {
    /// Logical width and height. A zero or non-finite size means the surface is
    /// not ready to be drawn on.
    fn logical_size(&self) -> (f64, f64);

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f64;

    /// Set the uniform logical-to-device scale. Absolute, not cumulative.
    fn set_scale(&mut self, factor: f64);

    fn clear(&mut self, rect: Rect);

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_maps_float_alpha_to_byte() {
        assert_eq!(Color::rgba(200, 200, 200, 0.2).a, 51);
        assert_eq!(Color::rgba(0, 200, 0, 0.8).a, 204);
        assert_eq!(Color::rgba(0, 0, 0, 7.0).a, 255);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#131722"), Some(Color::rgb(0x13, 0x17, 0x22)));
        assert_eq!(
            Color::from_hex("ff000080"),
            Some(Color {
                r: 255,
                g: 0,
                b: 0,
                a: 128
            })
        );
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn rect_edges() {
        let rect = Rect::new(60.0, 20.0, 690.0, 350.0);
        assert_eq!(rect.right(), 750.0);
        assert_eq!(rect.bottom(), 370.0);
        assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    }
}
