//! Bar Feed Module
//! Producers that hand the renderer a fresh bar sequence.
//!
//! The renderer never pulls data itself; the viewer and CLI own a
//! [`BarSource`] and pass its current bars in on every repaint.

use crate::data::PriceBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A sequence-producing collaborator.
pub trait BarSource {
    /// Current bars, oldest first.
    fn bars(&self) -> &[PriceBar];

    /// Pull the next update. Returns `true` when the bars changed.
    fn advance(&mut self) -> bool;
}

/// Fixed bars, e.g. loaded from a file.
#[derive(Debug, Clone, Default)]
pub struct StaticBars(pub Vec<PriceBar>);

impl BarSource for StaticBars {
    fn bars(&self) -> &[PriceBar] {
        &self.0
    }

    fn advance(&mut self) -> bool {
        false
    }
}

/// A listed instrument with its reference price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchlistEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub price: f64,
}

const fn entry(symbol: &'static str, name: &'static str, price: f64) -> WatchlistEntry {
    WatchlistEntry {
        symbol,
        name,
        price,
    }
}

pub const MARKET_WATCHLIST: [WatchlistEntry; 8] = [
    entry("RELIANCE", "Reliance Industries", 1548.75),
    entry("TCS", "Tata Consultancy", 3245.6),
    entry("HDFC", "HDFC Bank", 1678.25),
    entry("INFY", "Infosys", 1420.8),
    entry("ICICI", "ICICI Bank", 945.3),
    entry("WIPRO", "Wipro Limited", 412.75),
    entry("SBIN", "State Bank of India", 624.5),
    entry("HCLTECH", "HCL Technologies", 1156.4),
];

pub fn find_symbol(symbol: &str) -> Option<&'static WatchlistEntry> {
    MARKET_WATCHLIST
        .iter()
        .find(|entry| entry.symbol.eq_ignore_ascii_case(symbol))
}

/// Random-walk session around a base price with a sliding window of bars.
#[derive(Debug, Clone)]
pub struct SimulatedFeed {
    base_price: f64,
    rng: StdRng,
    bars: Vec<PriceBar>,
}

impl SimulatedFeed {
    /// A fresh session of `window_len` bars labelled `9:00`, `9:10`, ...
    pub fn new(base_price: f64, window_len: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bars = Self::session(&mut rng, base_price, window_len);
        Self {
            base_price,
            rng,
            bars,
        }
    }

    fn session(rng: &mut StdRng, base_price: f64, len: usize) -> Vec<PriceBar> {
        let volatility = base_price * 0.03;
        (0..len)
            .map(|i| {
                let trend = (i as f64 / 5.0).sin() * volatility
                    + (rng.gen::<f64>() - 0.5) * volatility * 0.5;
                let open = base_price + trend;
                let close = open + (rng.gen::<f64>() - 0.5) * volatility;
                let high = open.max(close) + rng.gen::<f64>() * (volatility * 0.5);
                let low = open.min(close) - rng.gen::<f64>() * (volatility * 0.5);
                let volume = rng.gen_range(5000..15000);

                PriceBar::new(session_label(i), open, high, low, close).with_volume(volume)
            })
            .collect()
    }

    /// Drop the oldest bar and append one opening at the last close.
    pub fn tick_with_label(&mut self, label: impl Into<String>) {
        let volatility = self.base_price * 0.01;
        let open = self.bars.last().map_or(self.base_price, |bar| bar.close);
        let close = open + (self.rng.gen::<f64>() - 0.5) * volatility * 2.0;
        let high = open.max(close) + self.rng.gen::<f64>() * volatility;
        let low = open.min(close) - self.rng.gen::<f64>() * volatility;
        let volume = self.rng.gen_range(5000..15000);

        if !self.bars.is_empty() {
            self.bars.remove(0);
        }
        self.bars
            .push(PriceBar::new(label, open, high, low, close).with_volume(volume));
    }
}

impl BarSource for SimulatedFeed {
    fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    fn advance(&mut self) -> bool {
        let label = chrono::Local::now().format("%H:%M").to_string();
        self.tick_with_label(label);
        true
    }
}

/// `9:00`, `9:10`, ... `9:50`, `10:00`, ...
pub fn session_label(index: usize) -> String {
    let minutes = (index % 6) * 10;
    if minutes == 0 {
        format!("{}:00", index / 6 + 9)
    } else {
        format!("{}:{}", index / 6 + 9, minutes)
    }
}
