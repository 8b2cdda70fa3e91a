//! Candle sources: Yahoo Finance, CSV directories, and the shared plumbing.

pub mod circuit_breaker;
pub mod csv;
pub mod provider;
pub mod symbols;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use self::csv::{read_candles, CsvProvider};
pub use provider::{
    into_series, CandleProvider, DataError, DataSource, FetchResult, DEFAULT_MAX_CANDLES,
};
pub use symbols::SymbolMap;
pub use yahoo::{ChartQuery, YahooProvider, DEFAULT_BASE_URL};
