//! Portfolio rebalancing as a sequential decision process.
//!
//! refolio simulates a cash-plus-holdings portfolio stepping through a close
//! price table, exposing the Gym-like `reset`/`step` contract a
//! reinforcement-learning policy consumes: a fixed-length observation of
//! current weights, one-step returns, and rolling volatility per asset; a
//! target-allocation action; a mark-to-market P&L reward; and a cash-costed
//! trade execution model that never lets cash go negative.
//!
//! A trained policy is replayed through the [`runner`] in two modes:
//! one-shot recommendation (a single observation, no state mutation) and
//! multi-step backtesting (strictly sequential, deterministic given a
//! deterministic policy).
//!
//! Bad ticks never abort an episode: non-finite or non-positive prices are
//! substituted with a floor sentinel, degenerate valuations fall back to the
//! initial cash endowment, and every such event is logged and counted on the
//! environment's [`Diagnostics`](gym::env::Diagnostics). Only configuration
//! errors (action shape, missing asset data) surface as `Err`.
//!
//! ```
//! use refolio::prelude::*;
//!
//! # fn main() -> RefolioResult<()> {
//! let table = PriceTable::builder()
//!     .with_series(Symbol::new("ALPHA"), vec![100.0, 110.0, 121.0])
//!     .with_series(Symbol::new("BETA"), vec![50.0, 45.0, 40.5])
//!     .build()?;
//!
//! let mut env = Environment::new(table, EnvConfig::default().with_initial_cash(1_000.0))?;
//! let mut policy = EqualWeight;
//!
//! let replay = env.backtest(&mut policy)?;
//! assert_eq!(replay.rewards.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod gym;
pub mod loader;
mod macros;
pub mod policy;
pub mod prelude;
pub mod provider;
pub mod runner;
