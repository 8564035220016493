//! Bar Processor Module
//! Turns a loaded DataFrame into an ordered sequence of price bars.

use crate::data::PriceBar;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// Required OHLC columns, matched case-insensitively.
const REQUIRED_COLUMNS: [&str; 5] = ["time", "open", "high", "low", "close"];

/// Handles DataFrame to bar conversion.
pub struct BarProcessor;

impl BarProcessor {
    /// Find the frame's spelling of `name`, ignoring case.
    pub fn resolve_column(df: &DataFrame, name: &str) -> Option<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .find(|col| col.trim().eq_ignore_ascii_case(name))
    }

    /// Convert rows to bars, in file order.
    ///
    /// Rows with a missing price are skipped. `volume` is optional; absent or
    /// negative values become 0.
    pub fn frame_to_bars(df: &DataFrame) -> Result<Vec<PriceBar>, ProcessorError> {
        let mut names = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for required in REQUIRED_COLUMNS {
            names.push(
                Self::resolve_column(df, required).ok_or(ProcessorError::MissingColumn(required))?,
            );
        }

        let time_series = df.column(&names[0])?;
        let open = df.column(&names[1])?.cast(&DataType::Float64)?;
        let high = df.column(&names[2])?.cast(&DataType::Float64)?;
        let low = df.column(&names[3])?.cast(&DataType::Float64)?;
        let close = df.column(&names[4])?.cast(&DataType::Float64)?;
        let (open, high, low, close) = (open.f64()?, high.f64()?, low.f64()?, close.f64()?);

        let volume = match Self::resolve_column(df, "volume") {
            Some(name) => Some(df.column(&name)?.cast(&DataType::Float64)?),
            None => None,
        };
        let volume = volume.as_ref().map(|col| col.f64()).transpose()?;

        let mut bars = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for i in 0..df.height() {
            let prices = (open.get(i), high.get(i), low.get(i), close.get(i));
            let (Some(o), Some(h), Some(l), Some(c)) = prices else {
                skipped += 1;
                continue;
            };
            let time = match time_series.get(i) {
                Ok(t) if !t.is_null() => t.to_string().trim_matches('"').to_string(),
                _ => String::new(),
            };
            let vol = volume
                .and_then(|ca| ca.get(i))
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|v| v.round() as u64)
                .unwrap_or(0);

            bars.push(PriceBar::new(time, o, h, l, c).with_volume(vol));
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} row(s) with missing prices");
        }

        Ok(bars)
    }
}
