//! Chart Viewer Widget
//! Central panel: records the chart at the window's pixel density, rasterizes
//! the recording and shows it as a texture. Re-renders only when the bars,
//! size or density change.

use candle_canvas::charts::{ChartRenderer, Color, DisplayList, RasterError, RasterSurface};
use candle_canvas::data::PriceBar;
use candle_canvas::ChartConfig;
use egui::{ColorImage, RichText, TextureHandle, TextureOptions};
use rusttype::Font;

/// What the current texture was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderKey {
    generation: u64,
    width: u32,
    height: u32,
    pixels_per_point: u32,
}

pub struct ChartViewer {
    renderer: ChartRenderer,
    background: Color,
    font: Option<Font<'static>>,
    texture: Option<TextureHandle>,
    rendered: Option<RenderKey>,
}

impl ChartViewer {
    pub fn new(config: ChartConfig, font: Option<Font<'static>>) -> Self {
        Self {
            background: config.background_color(),
            renderer: ChartRenderer::new(config),
            font,
            texture: None,
            rendered: None,
        }
    }

    fn surface(&self, width: f64, height: f64, ratio: f64) -> RasterSurface {
        RasterSurface::new(width, height, ratio)
            .with_background(self.background)
            .with_font(self.font.clone())
    }

    /// Render `bars` off-screen and encode as PNG.
    pub fn render_png(
        &self,
        bars: &[PriceBar],
        width: f64,
        height: f64,
    ) -> Result<Vec<u8>, RasterError> {
        let mut surface = self.surface(width, height, 1.0);
        self.renderer.render(&mut surface, bars);
        surface.to_png_bytes()
    }

    fn upload(&mut self, ctx: &egui::Context, surface: RasterSurface) {
        let image = surface.into_image();
        let pixels = ColorImage::from_rgba_unmultiplied(
            [image.width() as usize, image.height() as usize],
            image.as_raw(),
        );

        match &mut self.texture {
            Some(texture) => texture.set(pixels, TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("candle_chart", pixels, TextureOptions::LINEAR));
            }
        }
    }

    /// Draw the chart, filling the available space.
    pub fn show(&mut self, ui: &mut egui::Ui, bars: &[PriceBar], generation: u64) {
        let size = ui.available_size();
        if size.x < 1.0 || size.y < 1.0 {
            return;
        }
        if bars.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        let ppp = ui.ctx().pixels_per_point();
        let key = RenderKey {
            generation,
            width: size.x.to_bits(),
            height: size.y.to_bits(),
            pixels_per_point: ppp.to_bits(),
        };

        if self.rendered != Some(key) || self.texture.is_none() {
            let (width, height) = (size.x as f64, size.y as f64);
            let mut frame = DisplayList::new(width, height, ppp as f64);
            self.renderer.render(&mut frame, bars);

            // Keep the previous texture rather than upload a broken frame.
            if frame.is_finite() {
                let mut surface = self.surface(width, height, ppp as f64);
                frame.replay(&mut surface);
                self.upload(ui.ctx(), surface);
            } else {
                log::warn!("Dropping chart frame with non-finite coordinates");
            }
            self.rendered = Some(key);
        }

        if let Some(texture) = &self.texture {
            ui.image((texture.id(), size));
        }
    }
}
