//! Multi-symbol analysis.
//!
//! One immutable [`Analyzer`] is shared by reference across rayon workers.
//! Each symbol's series is analyzed independently and results come back in
//! input order regardless of which worker finished first.

use crate::data::FetchResult;
use rayon::prelude::*;
use retrace_core::{Analysis, Analyzer, Series};

#[derive(Debug, Clone)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub analysis: Analysis,
}

pub struct Scanner<'a> {
    analyzer: &'a Analyzer,
    parallel: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(analyzer: &'a Analyzer) -> Self {
        Self {
            analyzer,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn scan_series(&self, batch: &[(&str, &Series)]) -> Vec<SymbolAnalysis> {
        let run = |&(symbol, series): &(&str, &Series)| SymbolAnalysis {
            symbol: symbol.to_string(),
            analysis: self.analyzer.analyze(symbol, series),
        };
        if self.parallel {
            batch.par_iter().map(run).collect()
        } else {
            batch.iter().map(run).collect()
        }
    }

    pub fn scan(&self, fetched: &[FetchResult]) -> Vec<SymbolAnalysis> {
        let batch: Vec<(&str, &Series)> = fetched
            .iter()
            .map(|f| (f.symbol.as_str(), &f.series))
            .collect();
        self.scan_series(&batch)
    }
}
