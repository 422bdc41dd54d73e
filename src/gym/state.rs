use itertools::izip;

/// The portfolio's mutable simulation state: cash, per-asset share counts
/// (aligned to the price table's asset order), and the step counter.
///
/// Mutated exclusively by the step engine. Invariants after every commit:
/// `cash >= 0`, every share count finite and `>= 0`, `step_index` never
/// decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    cash: f64,
    shares: Vec<f64>,
    step_index: usize,
}

/// A `(holdings, cash)` snapshot taken before a trade commits, used as the
/// previous-value basis of the reward.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValueBasis {
    pub cash: f64,
    pub shares: Vec<f64>,
}

/// Sanitation flags raised while committing a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CommitFlags {
    pub cash_clamped: bool,
    pub holdings_clamped: usize,
}

impl PortfolioState {
    pub(crate) fn new(cash: f64, shares: Vec<f64>) -> Self {
        Self {
            cash,
            shares,
            step_index: 0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn shares(&self) -> &[f64] {
        &self.shares
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub(crate) fn snapshot(&self) -> ValueBasis {
        ValueBasis {
            cash: self.cash,
            shares: self.shares.clone(),
        }
    }

    /// Commits a trade: deducts the transaction cost, installs the sanitized
    /// target share counts, and advances the step counter.
    ///
    /// The clamp to zero is authoritative: a transient negative or non-finite
    /// cash value is never observable afterwards.
    pub(crate) fn commit(&mut self, target_shares: &[f64], trade_cost: f64) -> CommitFlags {
        let mut flags = CommitFlags::default();

        self.cash -= trade_cost;
        if !self.cash.is_finite() || self.cash < 0.0 {
            flags.cash_clamped = true;
            self.cash = 0.0;
        }

        debug_assert_eq!(self.shares.len(), target_shares.len());
        for (held, target) in izip!(&mut self.shares, target_shares) {
            let sanitized = if target.is_finite() && *target >= 0.0 {
                *target
            } else {
                flags.holdings_clamped += 1;
                0.0
            };
            *held = sanitized;
        }

        self.step_index += 1;
        flags
    }

    pub(crate) fn restore(&mut self, cash: f64, shares: Vec<f64>) {
        self.cash = cash;
        self.shares = shares;
        self.step_index = 0;
    }
}

/// Holdings valued at the given prices plus cash.
pub(crate) fn mark_to_market(prices: &[f64], shares: &[f64], cash: f64) -> f64 {
    izip!(prices, shares).map(|(p, s)| p * s).sum::<f64>() + cash
}
