//! CSV candle provider.
//!
//! Reads `<dir>/<SYMBOL>.csv` with header `timestamp,open,high,low,close,volume`.
//! Timestamps may be RFC 3339 strings or unix epochs (seconds, or milliseconds
//! when the value is above 1e11).

use super::provider::{into_series, CandleProvider, DataError, DataSource, FetchResult};
use chrono::{DateTime, Utc};
use retrace_core::Candle;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MILLIS_THRESHOLD: f64 = 1e11;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let epoch: f64 = raw
        .parse()
        .map_err(|_| format!("unrecognised timestamp {raw:?}"))?;
    let millis = if epoch.abs() > MILLIS_THRESHOLD {
        epoch
    } else {
        epoch * 1000.0
    };
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or_else(|| format!("timestamp out of range: {raw}"))
}

/// Read every candle from a CSV file.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    let display = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Io {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    let mut candles = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        // Row numbers are 1-based and exclude the header.
        let row_no = i + 1;
        let malformed = |reason: String| DataError::MalformedRow {
            path: display.clone(),
            row: row_no,
            reason,
        };
        let row = row.map_err(|e| malformed(e.to_string()))?;
        let timestamp = parse_timestamp(&row.timestamp).map_err(malformed)?;
        candles.push(Candle {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.unwrap_or(0.0),
        });
    }
    Ok(candles)
}

/// Serves candles from a directory of per-symbol CSV files.
pub struct CsvProvider {
    dir: PathBuf,
    max_candles: usize,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>, max_candles: usize) -> Self {
        Self {
            dir: dir.into(),
            max_candles,
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let candles = read_candles(&path)?;
        let series = into_series(symbol, candles, self.max_candles)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            series,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
