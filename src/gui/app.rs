//! Candle Canvas Main Application
//! Main window with control panel and live chart viewer.

use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use candle_canvas::data::{
    BarLoader, BarSource, PriceBar, SimulatedFeed, StaticBars, MARKET_WATCHLIST,
};
use candle_canvas::ChartConfig;
use egui::SidePanel;
use rusttype::Font;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use std::time::{Duration, Instant};

const EXPORT_SIZE: (f64, f64) = (1200.0, 600.0);

/// File loading result from background thread
enum LoadResult {
    Complete { path: PathBuf, bars: Vec<PriceBar> },
    Error(String),
}

/// Main application window.
pub struct CandleViewApp {
    config: ChartConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    source: Box<dyn BarSource>,
    /// Bumped whenever `source` yields different bars.
    generation: u64,
    last_tick: Instant,

    // Async file loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl CandleViewApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: ChartConfig,
        font: Option<Font<'static>>,
    ) -> Self {
        let first = &MARKET_WATCHLIST[0];
        let source = SimulatedFeed::new(first.price, config.window_len, rand::random());
        Self {
            chart_viewer: ChartViewer::new(config.clone(), font),
            control_panel: ControlPanel::new(),
            config,
            source: Box::new(source),
            generation: 0,
            last_tick: Instant::now(),
            load_rx: None,
            is_loading: false,
        }
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.config.tick_interval_secs.max(1))
    }

    fn replace_source(&mut self, source: Box<dyn BarSource>) {
        self.source = source;
        self.generation += 1;
        self.last_tick = Instant::now();
    }

    fn handle_select_symbol(&mut self, index: usize) {
        let Some(entry) = MARKET_WATCHLIST.get(index) else {
            return;
        };
        log::info!("Switching to simulated {} session", entry.symbol);
        let feed = SimulatedFeed::new(entry.price, self.config.window_len, rand::random());
        self.replace_source(Box::new(feed));
        self.control_panel.selected_symbol = Some(index);
        self.control_panel.source_label = format!("{} - {}", entry.symbol, entry.name);
        self.control_panel.set_status(format!("Simulating {}", entry.symbol));
    }

    /// Handle bar file selection, loaded on a background thread.
    fn handle_open_file(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Bars", &["csv", "json"])
            .pick_file()
        {
            self.control_panel
                .set_status(format!("Loading {}...", path.display()));
            self.is_loading = true;

            let (tx, rx) = channel();
            self.load_rx = Some(rx);

            thread::spawn(move || {
                let result = match BarLoader::load(&path) {
                    Ok(bars) => LoadResult::Complete { path, bars },
                    Err(e) => LoadResult::Error(e.to_string()),
                };
                let _ = tx.send(result);
            });
        }
    }

    /// Check for file loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { path, bars }) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.control_panel
                    .set_status(format!("Loaded {} bars", bars.len()));
                self.control_panel.source_label = name;
                self.control_panel.selected_symbol = None;
                self.control_panel.live = false;
                self.replace_source(Box::new(StaticBars(bars)));
                self.is_loading = false;
            }
            Ok(LoadResult::Error(error)) => {
                log::error!("Failed to load bars: {error}");
                self.control_panel.set_status(format!("Error: {error}"));
                self.is_loading = false;
            }
            Err(_) => self.load_rx = Some(rx),
        }
    }

    fn handle_export_png(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("candles.png")
            .save_file()
        else {
            return;
        };

        let (width, height) = EXPORT_SIZE;
        let result = self
            .chart_viewer
            .render_png(self.source.bars(), width, height)
            .map_err(|e| e.to_string())
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(|e| e.to_string()));

        match result {
            Ok(()) => {
                log::info!("Exported chart to {}", path.display());
                self.control_panel
                    .set_status(format!("Exported {}", path.display()));
                if let Err(e) = open::that(&path) {
                    log::warn!("Could not open {}: {e}", path.display());
                }
            }
            Err(e) => {
                log::error!("PNG export failed: {e}");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Advance the live feed once per tick interval.
    fn poll_feed(&mut self, ctx: &egui::Context) {
        if !self.control_panel.live || self.control_panel.selected_symbol.is_none() {
            return;
        }

        let interval = self.tick_interval();
        let elapsed = self.last_tick.elapsed();
        if elapsed >= interval {
            if self.source.advance() {
                self.generation += 1;
            }
            self.last_tick = Instant::now();
            ctx.request_repaint_after(interval);
        } else {
            ctx.request_repaint_after(interval - elapsed);
        }
    }
}

impl eframe::App for CandleViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        if self.is_loading {
            ctx.request_repaint();
        }
        self.poll_feed(ctx);

        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                let action = self
                    .control_panel
                    .show(ui, self.source.bars(), self.is_loading);

                match action {
                    ControlPanelAction::SelectSymbol(index) => self.handle_select_symbol(index),
                    ControlPanelAction::OpenFile => self.handle_open_file(),
                    ControlPanelAction::LiveToggled => self.last_tick = Instant::now(),
                    ControlPanelAction::ExportPng => self.handle_export_png(),
                    ControlPanelAction::None => {}
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer
                .show(ui, self.source.bars(), self.generation);
        });
    }
}
