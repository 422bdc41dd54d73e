use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{
    data::table::PriceTable,
    gym::{
        config::EnvConfig,
        execution::resolve_step_prices,
        state::{PortfolioState, mark_to_market},
    },
};

/// The fixed-length feature vector handed to a policy.
///
/// Three equal-length blocks, one entry per asset in asset order:
/// `[weights..., returns..., volatility...]`. The length is fixed at
/// environment construction (`3 × asset count`) and every produced vector is
/// padded or truncated to exactly that length, with any non-finite entry
/// replaced by 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    values: Vec<f64>,
    asset_count: usize,
}

impl Observation {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.asset_count
    }

    /// Current portfolio weight per asset.
    pub fn weights(&self) -> &[f64] {
        &self.values[..self.asset_count]
    }

    /// One-step price return per asset.
    pub fn returns(&self) -> &[f64] {
        &self.values[self.asset_count..2 * self.asset_count]
    }

    /// Rolling close-price volatility per asset.
    pub fn volatility(&self) -> &[f64] {
        &self.values[2 * self.asset_count..]
    }
}

/// Encodes the observation for the state's current step.
///
/// Pure given its inputs: calling it twice at the same step index with an
/// unchanged portfolio state yields identical vectors.
pub(crate) fn encode(
    table: &PriceTable,
    state: &PortfolioState,
    cfg: &EnvConfig,
    obs_len: usize,
) -> Observation {
    let n = table.asset_count();
    let step = state.step_index();
    let resolved = resolve_step_prices(table, step, cfg.price_floor());
    if resolved.substituted > 0 {
        tracing::debug!(
            step,
            substituted = resolved.substituted,
            "Substituted price floor while encoding observation"
        );
    }

    let weights = weight_block(&resolved.prices, state);
    let returns = return_block(table, &resolved.prices, step);
    let volatility = volatility_block(table, step, cfg.volatility_window());

    let mut values = Vec::with_capacity(obs_len);
    values.extend(weights);
    values.extend(returns);
    values.extend(volatility);

    // Pad or truncate to the fixed observation length, then scrub any
    // remaining non-finite entry.
    values.resize(obs_len, 0.0);
    for value in &mut values {
        if !value.is_finite() {
            *value = 0.0;
        }
    }

    Observation {
        values,
        asset_count: n,
    }
}

/// `weight_i = price_i × shares_i / total_value`; all zeros when the total
/// value is non-finite or non-positive.
fn weight_block(prices: &[f64], state: &PortfolioState) -> Vec<f64> {
    let total_value = mark_to_market(prices, state.shares(), state.cash());
    if !total_value.is_finite() || total_value <= 0.0 {
        return vec![0.0; prices.len()];
    }

    prices
        .iter()
        .zip(state.shares())
        .map(|(price, shares)| {
            let weight = price * shares / total_value;
            if weight.is_finite() { weight } else { 0.0 }
        })
        .collect()
}

/// One-step return against the previous raw close; 0 at the first step or
/// when the previous close is zero or non-finite.
fn return_block(table: &PriceTable, prices: &[f64], step: usize) -> Vec<f64> {
    (0..table.asset_count())
        .map(|asset| {
            let series = table.series(asset);
            let idx = step.min(series.len() - 1);
            if idx == 0 {
                return 0.0;
            }
            let prev = series[idx - 1];
            if !prev.is_finite() || prev == 0.0 {
                return 0.0;
            }
            let ret = (prices[asset] - prev) / prev;
            if ret.is_finite() { ret } else { 0.0 }
        })
        .collect()
}

/// Population standard deviation of the last `window` raw closes (current
/// step included), non-finite entries zeroed first; 0 until the window is
/// fully populated.
fn volatility_block(table: &PriceTable, step: usize, window: usize) -> Vec<f64> {
    (0..table.asset_count())
        .map(|asset| {
            let series = table.series(asset);
            let idx = step.min(series.len() - 1);
            if idx + 1 < window {
                return 0.0;
            }
            let closes = Array1::from_iter(
                series[idx + 1 - window..=idx]
                    .iter()
                    .map(|close| if close.is_finite() { *close } else { 0.0 }),
            );
            let vol = closes.std(0.0);
            if vol.is_finite() { vol } else { 0.0 }
        })
        .collect()
}
