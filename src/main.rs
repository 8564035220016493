//! Candle Canvas - OHLC Candlestick Chart Renderer & Live Chart Viewer
//!
//! Opens a live chart window by default; `render` and `simulate` write PNGs.

mod cli;
mod gui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, Exporter};
use eframe::egui;
use gui::CandleViewApp;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let config = cli::load_config(args.config.as_deref())?;
    let font = cli::font_for(&config)?;

    match args.command.unwrap_or(Command::View) {
        Command::View => {
            // Configure native options
            let options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([1200.0, 640.0])
                    .with_min_inner_size([800.0, 450.0])
                    .with_title("Candle Canvas"),
                ..Default::default()
            };

            eframe::run_native(
                "Candle Canvas",
                options,
                Box::new(move |cc| Ok(Box::new(CandleViewApp::new(cc, config, font)))),
            )
            .map_err(|e| anyhow::anyhow!("viewer exited with error: {e}"))
        }
        Command::Render {
            inputs,
            out_dir,
            size,
            open,
        } => {
            let exporter = Exporter::new(config, font);
            let written = exporter.render_files(&inputs, &out_dir, size)?;
            if open {
                cli::open_outputs(&written);
            }
            Ok(())
        }
        Command::Simulate {
            symbol,
            seed,
            ticks,
            out,
            size,
            open,
        } => {
            let exporter = Exporter::new(config, font);
            cli::run_simulate(&exporter, &symbol, seed, ticks, size, &out)?;
            if open {
                cli::open_outputs(&[out]);
            }
            Ok(())
        }
    }
}
