//! Command line interface: open the viewer or render charts to PNG.

use anyhow::{bail, Context, Result};
use candle_canvas::charts::{load_font, ChartRenderer, RasterSurface};
use candle_canvas::data::{
    find_symbol, session_label, BarLoader, BarSource, PriceBar, SimulatedFeed,
};
use candle_canvas::ChartConfig;
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use rusttype::Font;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "candle-canvas", version, about = "OHLC candlestick chart renderer")]
pub struct Cli {
    /// JSON chart config; unspecified keys keep their defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the live chart viewer (default)
    View,
    /// Render CSV/JSON bar files to PNG, one image per input
    Render {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
        /// Open the rendered images afterwards
        #[arg(long)]
        open: bool,
    },
    /// Render a simulated session for a watchlist symbol
    Simulate {
        #[arg(long, default_value = "RELIANCE")]
        symbol: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Live ticks to apply after the opening session
        #[arg(long, default_value_t = 0)]
        ticks: usize,
        #[arg(long, default_value = "simulated.png")]
        out: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
        #[arg(long)]
        open: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct SizeArgs {
    /// Logical width in pixels
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,
    /// Logical height in pixels
    #[arg(long, default_value_t = 400.0)]
    pub height: f64,
    /// Device pixels per logical pixel
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

pub fn load_config(path: Option<&Path>) -> Result<ChartConfig> {
    match path {
        Some(path) => ChartConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ChartConfig::default()),
    }
}

/// Shared state for headless rendering.
pub struct Exporter {
    renderer: ChartRenderer,
    config: ChartConfig,
    font: Option<Font<'static>>,
}

impl Exporter {
    pub fn new(config: ChartConfig, font: Option<Font<'static>>) -> Self {
        Self {
            renderer: ChartRenderer::new(config.clone()),
            config,
            font,
        }
    }

    pub fn render_to(&self, bars: &[PriceBar], size: SizeArgs, out: &Path) -> Result<()> {
        if !(size.width > 0.0 && size.height > 0.0 && size.scale > 0.0) {
            bail!("width, height and scale must be positive");
        }
        let mut surface = RasterSurface::new(size.width, size.height, size.scale)
            .with_background(self.config.background_color())
            .with_font(self.font.clone());
        self.renderer.render(&mut surface, bars);
        surface
            .save_png(out)
            .with_context(|| format!("writing {}", out.display()))?;
        log::info!("Wrote {} ({} bars)", out.display(), bars.len());
        Ok(())
    }

    /// Render every input in parallel; each gets its own surface.
    pub fn render_files(
        &self,
        inputs: &[PathBuf],
        out_dir: &Path,
        size: SizeArgs,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating {}", out_dir.display()))?;

        let results: Vec<Result<PathBuf>> = inputs
            .par_iter()
            .map(|input| {
                let bars = BarLoader::load(input)
                    .with_context(|| format!("loading {}", input.display()))?;
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "chart".to_string());
                let out = out_dir.join(format!("{stem}.png"));
                self.render_to(&bars, size, &out)?;
                Ok(out)
            })
            .collect();

        let mut written = Vec::new();
        let mut failures = 0;
        for result in results {
            match result {
                Ok(path) => written.push(path),
                Err(e) => {
                    log::error!("{e:#}");
                    failures += 1;
                }
            }
        }
        if failures > 0 {
            bail!("{failures} of {} input(s) failed to render", inputs.len());
        }
        Ok(written)
    }
}

pub fn open_outputs(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = open::that(path) {
            log::warn!("Could not open {}: {e}", path.display());
        }
    }
}

pub fn run_simulate(
    exporter: &Exporter,
    symbol: &str,
    seed: u64,
    ticks: usize,
    size: SizeArgs,
    out: &Path,
) -> Result<()> {
    let Some(entry) = find_symbol(symbol) else {
        bail!("unknown symbol {symbol:?}");
    };
    let window_len = exporter.config.window_len;
    let mut feed = SimulatedFeed::new(entry.price, window_len, seed);
    // Continue the session clock past its last bar.
    for index in window_len..window_len + ticks {
        feed.tick_with_label(session_label(index));
    }
    exporter.render_to(feed.bars(), size, out)
}

pub fn font_for(config: &ChartConfig) -> Result<Option<Font<'static>>> {
    load_font(config.font_path.as_deref()).context("loading font")
}
