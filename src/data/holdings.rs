use serde::{Deserialize, Serialize};

use crate::{
    data::{
        domain::{Quantity, Symbol},
        table::PriceTable,
    },
    error::{DataError, RefolioResult},
};

/// Canonical portfolio holdings: an ordered mapping from asset symbol to a
/// non-negative share count.
///
/// Every ingestion path (broker exports, generic holdings files, manual
/// construction) produces this one structure. Validation happens at the
/// boundary: share counts must be finite and non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holdings(Vec<(Symbol, Quantity)>);

impl Holdings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a position without validation; prefer [`Holdings::try_from_pairs`]
    /// for untrusted input.
    pub fn with_position(mut self, symbol: Symbol, shares: Quantity) -> Self {
        self.0.push((symbol, shares));
        self
    }

    /// Builds holdings from `(symbol, share count)` pairs, rejecting
    /// non-finite or negative counts.
    pub fn try_from_pairs(
        pairs: impl IntoIterator<Item = (Symbol, f64)>,
    ) -> RefolioResult<Self> {
        let mut holdings = Self::new();
        for (symbol, shares) in pairs {
            if !shares.is_finite() || shares < 0.0 {
                return Err(DataError::InvalidShareCount {
                    symbol: symbol.to_string(),
                    shares,
                }
                .into());
            }
            holdings.0.push((symbol, Quantity(shares)));
        }
        Ok(holdings)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Symbol, Quantity)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Share counts aligned to `table`'s asset order. Table assets without a
    /// position get 0 shares; a position whose symbol is absent from the table
    /// is a configuration error, not a data gap.
    pub fn align_to(&self, table: &PriceTable) -> RefolioResult<Vec<f64>> {
        let mut shares = vec![0.0; table.asset_count()];
        for (symbol, qty) in &self.0 {
            let Some(idx) = table.position(symbol) else {
                return Err(DataError::MissingAssetData(symbol.to_string()).into());
            };
            shares[idx] += qty.0;
        }
        Ok(shares)
    }
}
