//! Display List
//! A [`DrawSurface`] that records commands instead of rasterizing them.
//!
//! The viewer renders into a display list, checks it with
//! [`DisplayList::is_finite`], and only then replays it onto the raster
//! surface. Tests use it to inspect geometry.

use crate::charts::surface::{Color, DrawSurface, Point, Rect, Stroke, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rect),
    Line { from: Point, to: Point, stroke: Stroke },
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, stroke: Stroke },
    Text { text: String, at: Point, style: TextStyle },
}

impl DrawCommand {
    fn is_finite(&self) -> bool {
        match self {
            DrawCommand::Clear(rect) => rect.is_finite(),
            DrawCommand::Line { from, to, stroke } => {
                from.is_finite() && to.is_finite() && stroke.width.is_finite()
            }
            DrawCommand::FillRect { rect, .. } => rect.is_finite(),
            DrawCommand::StrokeRect { rect, stroke } => {
                rect.is_finite() && stroke.width.is_finite()
            }
            DrawCommand::Text { at, style, .. } => at.is_finite() && style.size.is_finite(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    width: f64,
    height: f64,
    ratio: f64,
    scale: f64,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(width: f64, height: f64, ratio: f64) -> Self {
        Self {
            width,
            height,
            ratio,
            scale: 1.0,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Scale most recently set by the renderer.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// True when no recorded coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.commands.iter().all(DrawCommand::is_finite)
    }

    /// Issue every recorded command against `target`, in order.
    pub fn replay<S: DrawSurface + ?Sized>(&self, target: &mut S) {
        target.set_scale(self.scale);
        for command in &self.commands {
            match command {
                DrawCommand::Clear(rect) => target.clear(*rect),
                DrawCommand::Line { from, to, stroke } => target.draw_line(*from, *to, *stroke),
                DrawCommand::FillRect { rect, color } => target.fill_rect(*rect, *color),
                DrawCommand::StrokeRect { rect, stroke } => target.stroke_rect(*rect, *stroke),
                DrawCommand::Text { text, at, style } => target.draw_text(text, *at, style),
            }
        }
    }
}

impl DrawSurface for DisplayList {
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
        // A full clear hides everything recorded so far.
        let covers = rect.x <= 0.0
            && rect.y <= 0.0
            && rect.right() >= self.width
            && rect.bottom() >= self.height;
        if covers {
            self.commands.clear();
        }
        self.commands.push(DrawCommand::Clear(rect));
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeRect { rect, stroke });
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            style: style.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_clear_discards_earlier_commands() {
        let mut list = DisplayList::new(100.0, 50.0, 1.0);
        list.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        list.clear(Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(list.commands().len(), 2);

        list.clear(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(list.commands(), &[DrawCommand::Clear(Rect::new(0.0, 0.0, 100.0, 50.0))]);
    }

    #[test]
    fn replay_reproduces_commands_and_scale() {
        let mut source = DisplayList::new(100.0, 50.0, 2.0);
        source.set_scale(2.0);
        source.clear(Rect::new(0.0, 0.0, 100.0, 50.0));
        source.draw_line(
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Stroke::hairline(Color::WHITE),
        );

        let mut target = DisplayList::new(100.0, 50.0, 2.0);
        source.replay(&mut target);
        assert_eq!(target, source);
    }

    #[test]
    fn detects_non_finite_coordinates() {
        let mut list = DisplayList::new(100.0, 50.0, 1.0);
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        assert!(list.is_finite());
        list.draw_line(
            Point::new(0.0, f64::NAN),
            Point::new(0.0, 1.0),
            Stroke::hairline(Color::WHITE),
        );
        assert!(!list.is_finite());
    }
}
