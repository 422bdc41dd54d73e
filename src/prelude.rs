//! Convenience re-exports for the common workflow: build a price table,
//! construct an environment, replay a policy.

pub use crate::{
    data::{
        domain::{Price, Quantity, Symbol},
        holdings::Holdings,
        table::PriceTable,
    },
    error::{DataError, EnvError, FetchError, RefolioError, RefolioResult},
    gym::{
        Env, EnvStatus, Reward, StepInfo, StepOutcome,
        action::Action,
        config::EnvConfig,
        env::{Diagnostics, Environment},
        observation::Observation,
    },
    loader::{
        portfolio::{PortfolioFormat, load_portfolio_csv},
        prices::load_price_csv,
    },
    policy::{
        Policy,
        baseline::{EqualWeight, HoldCurrent, Random},
    },
    provider::{
        PriceFeed, StaticFeed, snapshot_table,
        cache::{CachedFeed, QuoteCache},
    },
    runner::{Backtest, Recommendation},
};
