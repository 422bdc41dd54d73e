use itertools::izip;

use crate::{data::table::PriceTable, gym::action::TargetAllocation};

/// Guards the division by the unscaled cost during the cash-bounded
/// scale-down.
pub(crate) const COST_SCALE_EPSILON: f64 = 1e-6;

/// Per-asset prices resolved for one step, with the floor sentinel already
/// applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedPrices {
    pub prices: Vec<f64>,
    /// How many entries were substituted with the floor sentinel.
    pub substituted: usize,
}

/// Looks up every asset's close at `step` (clamped to the series end) and
/// substitutes `floor` for non-finite or non-positive values.
pub(crate) fn resolve_step_prices(table: &PriceTable, step: usize, floor: f64) -> ResolvedPrices {
    let mut substituted = 0;
    let prices = (0..table.asset_count())
        .map(|asset| {
            let close = table.close(asset, step);
            if close.is_finite() && close > 0.0 {
                close
            } else {
                substituted += 1;
                floor
            }
        })
        .collect();

    ResolvedPrices {
        prices,
        substituted,
    }
}

/// Outcome of the trade-cost model for one step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TradePlan {
    /// Share counts the portfolio should hold after the trade.
    pub target_shares: Vec<f64>,
    /// Transaction cost on gross traded notional, recomputed after any
    /// scale-down.
    pub cost: f64,
    /// Whether trades were scaled down because cash could not cover the cost.
    pub scaled_down: bool,
}

/// Translates a sanitized allocation into target shares and prices the trade.
///
/// If pre-trade cash cannot cover the transaction cost, every trade is scaled
/// by `cash / (cost + ε)` and the cost is recomputed from the scaled trades,
/// so a single step can never push cash negative through costs alone.
pub(crate) fn plan_rebalance(
    allocation: &TargetAllocation,
    prices: &[f64],
    held_shares: &[f64],
    cash: f64,
    total_value: f64,
    cost_rate: f64,
) -> TradePlan {
    let mut target_shares: Vec<f64> = izip!(allocation.weights(), prices)
        .map(|(weight, price)| {
            if *price > 0.0 {
                weight * total_value / price
            } else {
                0.0
            }
        })
        .collect();

    let cost = gross_cost(&target_shares, held_shares, prices, cost_rate);

    let mut scaled_down = false;
    let mut final_cost = cost;
    if cash < cost {
        scaled_down = true;
        let scale = cash / (cost + COST_SCALE_EPSILON);
        for (target, held) in izip!(&mut target_shares, held_shares) {
            *target = held + (*target - held) * scale;
        }
        final_cost = gross_cost(&target_shares, held_shares, prices, cost_rate);
    }

    TradePlan {
        target_shares,
        cost: final_cost,
        scaled_down,
    }
}

fn gross_cost(target: &[f64], held: &[f64], prices: &[f64], cost_rate: f64) -> f64 {
    izip!(target, held, prices)
        .map(|(t, h, p)| (t - h).abs() * p)
        .sum::<f64>()
        * cost_rate
}
