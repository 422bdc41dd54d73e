use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{impl_abs_primitive, impl_add_sub_sum_primitive, impl_from_primitive};

// ================================================================================================
// Domain Strong Types (NewTypes)
// ================================================================================================

/// Represents a price level in the quote currency.
///
/// Used for: close quotes, valuation, and trade-cost notional.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(pub f64);
impl_from_primitive!(Price, f64);
impl_add_sub_sum_primitive!(Price, f64);
impl_abs_primitive!(Price, f64);

/// Represents a precise share count of an asset.
///
/// Wraps `f64` to support fractional shares while providing strong typing
/// against prices or other metrics. Negative values are rejected in storage
/// but may appear in trade-delta calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Quantity(pub f64);
impl_from_primitive!(Quantity, f64);
impl_add_sub_sum_primitive!(Quantity, f64);
impl_abs_primitive!(Quantity, f64);

/// An asset identifier (ticker symbol). Cheap to clone and compare.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Symbol(pub Arc<String>);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(Arc::new(symbol.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
