//! Bar Loader Module
//! Reads price bars from CSV (via Polars) or JSON files.

use crate::data::processor::{BarProcessor, ProcessorError};
use crate::data::PriceBar;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid bar JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("No bars in {0}")]
    NoData(PathBuf),
}

/// Loads bar sequences from disk.
pub struct BarLoader;

impl BarLoader {
    /// Load by extension: `.csv` or `.json`.
    pub fn load(path: &Path) -> Result<Vec<PriceBar>, LoaderError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());

        let bars = match extension.as_deref() {
            Some("csv") => Self::load_csv(path)?,
            Some("json") => Self::load_json(path)?,
            _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        };

        if bars.is_empty() {
            return Err(LoaderError::NoData(path.to_path_buf()));
        }
        log::info!("Loaded {} bars from {}", bars.len(), path.display());
        Ok(bars)
    }

    /// Load a CSV file with `time,open,high,low,close[,volume]` columns.
    pub fn load_csv(path: &Path) -> Result<Vec<PriceBar>, LoaderError> {
        let path_str = path.to_string_lossy().to_string();

        let df = LazyCsvReader::new(&path_str)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Ok(BarProcessor::frame_to_bars(&df)?)
    }

    /// Load a JSON array of bar objects.
    pub fn load_json(path: &Path) -> Result<Vec<PriceBar>, LoaderError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_json(&text)
    }

    pub fn parse_json(text: &str) -> Result<Vec<PriceBar>, LoaderError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "candle_canvas_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_csv_in_file_order() {
        let path = temp_file(
            "bars.csv",
            "time,open,high,low,close,volume\n\
             9:00,1548.75,1560.1,1540.2,1555.0,7000\n\
             9:10,1555.0,1558.0,1530.4,1533.3,6400\n",
        );
        let bars = BarLoader::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time, "9:00");
        assert_eq!(bars[1].close, 1533.3);
        assert_eq!(bars[1].volume, 6400);
    }

    #[test]
    fn loads_json_array() {
        let path = temp_file(
            "bars.json",
            r#"[{"time":"9:00","open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":10},
                {"time":"9:10","open":1.5,"high":1.6,"low":1.1,"close":1.2}]"#,
        );
        let bars = BarLoader::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].volume, 10);
        assert_eq!(bars[1].volume, 0);
    }

    #[test]
    fn empty_json_is_no_data() {
        let path = temp_file("empty.json", "[]");
        let err = BarLoader::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, LoaderError::NoData(_)));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = BarLoader::load(Path::new("bars.parquet")).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }

    #[test]
    fn reports_bad_json() {
        assert!(matches!(
            BarLoader::parse_json(r#"[{"time":"9:00"}]"#),
            Err(LoaderError::Json(_))
        ));
    }
}
