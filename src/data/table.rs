use serde::{Deserialize, Serialize};

use crate::{
    data::domain::Symbol,
    error::{DataError, RefolioResult},
};

/// The close-price table backing a simulation run.
///
/// One price series per asset, all sharing the same step-index domain: either
/// equally long historical series, or a single live snapshot of length 1.
/// Asset order is the declaration order and fixes the layout of observations,
/// actions, and holdings for the lifetime of an environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTable {
    symbols: Vec<Symbol>,
    series: Vec<Box<[f64]>>,
    step_count: usize,
}

impl PriceTable {
    pub fn builder() -> PriceTableBuilder {
        PriceTableBuilder::default()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn asset_count(&self) -> usize {
        self.symbols.len()
    }

    /// Number of simulation steps available (length of the shortest series;
    /// by construction all series are equally long).
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Position of `symbol` in asset order, if present.
    pub fn position(&self, symbol: &Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Raw close for `asset` at `step`, with the index clamped to the last
    /// recorded step. No guards are applied here; the sentinel substitution
    /// policy lives with the simulation core.
    pub fn close(&self, asset: usize, step: usize) -> f64 {
        let series = &self.series[asset];
        series[step.min(series.len() - 1)]
    }

    /// The full raw series for `asset`.
    pub fn series(&self, asset: usize) -> &[f64] {
        &self.series[asset]
    }
}

// ================================================================================================
// Builder
// ================================================================================================

#[derive(Debug, Default)]
pub struct PriceTableBuilder {
    entries: Vec<(Symbol, Vec<f64>)>,
}

impl PriceTableBuilder {
    pub fn with_series(mut self, symbol: Symbol, closes: Vec<f64>) -> Self {
        self.entries.push((symbol, closes));
        self
    }

    pub fn build(self) -> RefolioResult<PriceTable> {
        let expected = match self.entries.first() {
            Some((_, closes)) => closes.len(),
            None => return Err(DataError::EmptyPriceTable.into()),
        };

        let mut symbols = Vec::with_capacity(self.entries.len());
        let mut series = Vec::with_capacity(self.entries.len());

        for (symbol, closes) in self.entries {
            if closes.is_empty() {
                return Err(DataError::EmptyPriceSeries(symbol.to_string()).into());
            }
            if closes.len() != expected {
                return Err(DataError::SeriesLengthMismatch {
                    symbol: symbol.to_string(),
                    expected,
                    got: closes.len(),
                }
                .into());
            }
            if symbols.contains(&symbol) {
                return Err(DataError::DuplicateSymbol(symbol.to_string()).into());
            }
            symbols.push(symbol);
            series.push(closes.into_boxed_slice());
        }

        Ok(PriceTable {
            symbols,
            series,
            step_count: expected,
        })
    }
}
