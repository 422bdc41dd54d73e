use serde::{Deserialize, Serialize};

use crate::{
    data::holdings::Holdings,
    error::{EnvError, RefolioResult},
};

/// Proportional transaction cost on gross traded notional (10 bps).
pub const DEFAULT_TRADE_COST_RATE: f64 = 1e-3;

/// Substitute for a missing, non-finite, or non-positive price. Never zero,
/// so downstream ratios stay defined.
pub const DEFAULT_PRICE_FLOOR: f64 = 1e-6;

/// Rolling window (in steps, current step included) for the volatility block.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 5;

const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

/// Environment construction parameters.
///
/// ```
/// use refolio::gym::config::EnvConfig;
///
/// let cfg = EnvConfig::default().with_initial_cash(10_000.0);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    initial_cash: f64,
    initial_holdings: Option<Holdings>,
    trade_cost_rate: f64,
    price_floor: f64,
    volatility_window: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
            initial_holdings: None,
            trade_cost_rate: DEFAULT_TRADE_COST_RATE,
            price_floor: DEFAULT_PRICE_FLOOR,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
        }
    }
}

impl EnvConfig {
    pub fn with_initial_cash(self, initial_cash: f64) -> Self {
        Self {
            initial_cash,
            ..self
        }
    }

    /// Starting allocation. Defaults to all-zero holdings.
    pub fn with_initial_holdings(self, holdings: Holdings) -> Self {
        Self {
            initial_holdings: Some(holdings),
            ..self
        }
    }

    pub fn with_trade_cost_rate(self, trade_cost_rate: f64) -> Self {
        Self {
            trade_cost_rate,
            ..self
        }
    }

    pub fn with_volatility_window(self, volatility_window: usize) -> Self {
        Self {
            volatility_window,
            ..self
        }
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn initial_holdings(&self) -> Option<&Holdings> {
        self.initial_holdings.as_ref()
    }

    pub fn trade_cost_rate(&self) -> f64 {
        self.trade_cost_rate
    }

    pub fn price_floor(&self) -> f64 {
        self.price_floor
    }

    pub fn volatility_window(&self) -> usize {
        self.volatility_window
    }

    pub fn validate(&self) -> RefolioResult<()> {
        if !self.initial_cash.is_finite() || self.initial_cash < 0.0 {
            return Err(EnvError::InvalidConfig(format!(
                "Initial cash must be finite and non-negative. Got: {}",
                self.initial_cash
            ))
            .into());
        }
        if !self.trade_cost_rate.is_finite() || self.trade_cost_rate < 0.0 {
            return Err(EnvError::InvalidConfig(format!(
                "Trade cost rate must be finite and non-negative. Got: {}",
                self.trade_cost_rate
            ))
            .into());
        }
        if !self.price_floor.is_finite() || self.price_floor <= 0.0 {
            return Err(EnvError::InvalidConfig(format!(
                "Price floor must be finite and positive. Got: {}",
                self.price_floor
            ))
            .into());
        }
        if self.volatility_window == 0 {
            return Err(
                EnvError::InvalidConfig("Volatility window must be at least 1".to_string()).into(),
            );
        }
        Ok(())
    }
}
