use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    data::{domain::Symbol, table::PriceTable},
    error::{EnvError, RefolioResult},
    gym::{
        Env, EnvStatus, Reward, StepInfo, StepOutcome,
        action::Action,
        config::EnvConfig,
        execution::{plan_rebalance, resolve_step_prices},
        observation::{Observation, encode},
        state::{PortfolioState, ValueBasis, mark_to_market},
    },
};

/// Counters for locally recovered numeric conditions.
///
/// These are design invariants of the simulation, not failures: a bad tick
/// must never abort an episode. Each recovery is logged and tallied here so a
/// caller can audit data quality after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Prices replaced by the floor sentinel.
    pub price_substitutions: u64,
    /// Degenerate valuations replaced by the initial cash endowment.
    pub valuation_fallbacks: u64,
    /// Trades scaled down because cash could not cover the transaction cost.
    pub trade_scale_downs: u64,
    /// Cash clamped to zero after the cost deduction.
    pub cash_clamps: u64,
    /// Target share entries clamped to zero (negative or non-finite).
    pub holding_clamps: u64,
    /// Rewards reported as zero because the computation was non-finite.
    pub non_finite_rewards: u64,
}

/// The portfolio rebalancing simulation environment.
///
/// Owns the price table, the configuration, and the single episode's
/// [`PortfolioState`]. One environment instance belongs to exactly one
/// running episode; concurrent episodes each get their own instance.
#[derive(Debug, Clone)]
pub struct Environment {
    table: PriceTable,
    cfg: EnvConfig,
    state: PortfolioState,
    /// Pre-trade snapshot of the most recent step, the reward basis.
    prev: ValueBasis,
    initial_shares: Vec<f64>,
    obs_len: usize,
    status: EnvStatus,
    diagnostics: Diagnostics,
}

impl Environment {
    /// Builds an environment over `table`.
    ///
    /// Fails if the configuration is invalid or if an initial holding names
    /// an asset absent from the table.
    pub fn new(table: PriceTable, cfg: EnvConfig) -> RefolioResult<Self> {
        cfg.validate()?;

        let initial_shares = match cfg.initial_holdings() {
            Some(holdings) => holdings.align_to(&table)?,
            None => vec![0.0; table.asset_count()],
        };

        let state = PortfolioState::new(cfg.initial_cash(), initial_shares.clone());
        let prev = state.snapshot();
        let obs_len = 3 * table.asset_count();

        Ok(Self {
            table,
            cfg,
            state,
            prev,
            initial_shares,
            obs_len,
            status: EnvStatus::Ready,
            diagnostics: Diagnostics::default(),
        })
    }

    pub fn asset_count(&self) -> usize {
        self.table.asset_count()
    }

    /// Number of simulation steps before the episode terminates.
    pub fn step_count(&self) -> usize {
        self.table.step_count()
    }

    /// Fixed observation length: `3 × asset count`.
    pub fn observation_len(&self) -> usize {
        self.obs_len
    }

    pub fn symbols(&self) -> &[Symbol] {
        self.table.symbols()
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn status(&self) -> EnvStatus {
        self.status
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Encodes the observation for the current step without mutating state.
    /// Idempotent: two calls without an intervening step yield identical
    /// vectors.
    pub fn observe(&self) -> Observation {
        encode(&self.table, &self.state, &self.cfg, self.obs_len)
    }

    fn check_step_status(&self) -> RefolioResult<()> {
        use EnvStatus::*;
        match self.status {
            Running => Ok(()),
            Ready => Err(EnvError::InvalidState(
                "Environment is not started. Call `reset()` before stepping.".to_string(),
            )
            .into()),
            Done => Err(EnvError::InvalidState(
                "Price series is exhausted. Call `reset()` to start over.".to_string(),
            )
            .into()),
        }
    }

    /// Portfolio value at the state's current step, sanitized to 0 if
    /// non-finite. Counts any sentinel substitutions it performs.
    fn realized_value(&mut self) -> f64 {
        let resolved =
            resolve_step_prices(&self.table, self.state.step_index(), self.cfg.price_floor());
        self.diagnostics.price_substitutions += resolved.substituted as u64;

        let value = mark_to_market(&resolved.prices, self.state.shares(), self.state.cash());
        if value.is_finite() {
            value
        } else {
            warn!(value, "Non-finite portfolio value sanitized to 0");
            0.0
        }
    }
}

impl Env for Environment {
    #[tracing::instrument(skip(self))]
    fn reset(&mut self) -> RefolioResult<Observation> {
        self.state
            .restore(self.cfg.initial_cash(), self.initial_shares.clone());
        self.prev = self.state.snapshot();
        self.status = EnvStatus::Running;
        Ok(self.observe())
    }

    #[tracing::instrument(skip(self, action), fields(step = self.state.step_index()))]
    fn step(
        &mut self,
        action: Action,
    ) -> RefolioResult<(Observation, Reward, StepOutcome, StepInfo)> {
        self.check_step_status()?;
        action.validate_shape(self.table.asset_count())?;
        let allocation = action.sanitize();

        // Price resolution at the pre-trade step index. These are also the
        // previous-step prices of the reward basis after the counter advances.
        let resolved =
            resolve_step_prices(&self.table, self.state.step_index(), self.cfg.price_floor());
        self.diagnostics.price_substitutions += resolved.substituted as u64;

        // Valuation, falling back to the initial endowment so a degenerate
        // post-crash state cannot freeze all future trades.
        let mut total_value =
            mark_to_market(&resolved.prices, self.state.shares(), self.state.cash());
        if !total_value.is_finite() || total_value <= 0.0 {
            warn!(
                total_value,
                "Degenerate valuation, falling back to initial cash"
            );
            self.diagnostics.valuation_fallbacks += 1;
            total_value = self.cfg.initial_cash();
        }

        let plan = plan_rebalance(
            &allocation,
            &resolved.prices,
            self.state.shares(),
            self.state.cash(),
            total_value,
            self.cfg.trade_cost_rate(),
        );
        if plan.scaled_down {
            warn!(
                cost = plan.cost,
                cash = self.state.cash(),
                "Trades scaled down to keep cash non-negative"
            );
            self.diagnostics.trade_scale_downs += 1;
        }

        // Commit: snapshot the reward basis, then mutate.
        self.prev = self.state.snapshot();
        let flags = self.state.commit(&plan.target_shares, plan.cost);
        if flags.cash_clamped {
            warn!("Cash became invalid after cost deduction, clamped to 0");
            self.diagnostics.cash_clamps += 1;
        }
        if flags.holdings_clamped > 0 {
            warn!(
                entries = flags.holdings_clamped,
                "Invalid target share entries clamped to 0"
            );
            self.diagnostics.holding_clamps += flags.holdings_clamped as u64;
        }

        // Mark-to-market reward at the new step's prices against the
        // pre-trade snapshot at the previous step's prices.
        let post_value = self.realized_value();
        let prev_value = {
            let value = mark_to_market(&resolved.prices, &self.prev.shares, self.prev.cash);
            if value.is_finite() { value } else { 0.0 }
        };
        let mut reward = post_value - prev_value;
        if !reward.is_finite() {
            warn!(reward, "Non-finite reward reported as 0");
            self.diagnostics.non_finite_rewards += 1;
            reward = 0.0;
        }

        let outcome = if self.state.step_index() >= self.table.step_count() {
            self.status = EnvStatus::Done;
            StepOutcome::Done
        } else {
            StepOutcome::InProgress
        };

        let info = StepInfo {
            portfolio_value: post_value,
        };

        Ok((self.observe(), Reward(reward), outcome, info))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::{domain::Symbol, holdings::Holdings};

    // ============================================================================
    // Test Helpers
    // ============================================================================

    /// The concrete two-asset scenario from the rebalancing contract:
    /// ALPHA = [100, 110], BETA = [50, 45], 1000 cash, zero holdings.
    fn scenario_env() -> Environment {
        let table = PriceTable::builder()
            .with_series(Symbol::new("ALPHA"), vec![100.0, 110.0])
            .with_series(Symbol::new("BETA"), vec![50.0, 45.0])
            .build()
            .unwrap();
        Environment::new(table, EnvConfig::default().with_initial_cash(1_000.0)).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // ============================================================================
    // Part 1: The Concrete Scenario
    // ============================================================================

    #[test]
    fn fifty_fifty_allocation_step_by_step() {
        let mut env = scenario_env();
        env.reset().unwrap();

        let (_obs, reward, outcome, info) = env.step(Action::from(vec![0.5, 0.5])).unwrap();

        // Target notional 500 each -> 5 ALPHA shares, 10 BETA shares.
        assert_eq!(env.state().shares(), &[5.0, 10.0]);
        // Cost (5*100 + 10*50) * 0.001 = 1.0 -> cash 999.
        assert_close(env.state().cash(), 999.0);
        // Value at the next step's prices: 5*110 + 10*45 + 999 = 1999.
        assert_close(info.portfolio_value, 1_999.0);
        // Reward against the pre-trade basis of 1000.
        assert_close(reward.0, 999.0);
        assert!(!outcome.is_done());
    }

    #[test]
    fn reward_equals_value_delta_every_step() {
        let mut env = scenario_env();
        env.reset().unwrap();

        let mut prev_value = 1_000.0;
        loop {
            let (_obs, reward, outcome, info) = env.step(Action::from(vec![0.5, 0.5])).unwrap();
            assert_close(reward.0, info.portfolio_value - prev_value);
            prev_value = info.portfolio_value;
            if outcome.is_done() {
                break;
            }
        }
    }

    // ============================================================================
    // Part 2: Lifecycle & Status Guards
    // ============================================================================

    #[test]
    fn step_before_reset_is_an_error() {
        let mut env = scenario_env();
        let result = env.step(Action::from(vec![0.5, 0.5]));
        assert!(matches!(
            result,
            Err(crate::error::RefolioError::Env(EnvError::InvalidState(_)))
        ));
    }

    #[test]
    fn terminates_exactly_when_series_is_exhausted() {
        let mut env = scenario_env();
        env.reset().unwrap();

        let (_, _, first, _) = env.step(Action::from(vec![0.0, 0.0])).unwrap();
        assert!(!first.is_done());

        let (_, _, second, _) = env.step(Action::from(vec![0.0, 0.0])).unwrap();
        assert!(second.is_done());
        assert!(env.status().is_done());

        // Stepping a finished environment is an error, not a silent no-op.
        assert!(env.step(Action::from(vec![0.0, 0.0])).is_err());
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let mut env = scenario_env();
        env.reset().unwrap();
        env.step(Action::from(vec![0.5, 0.5])).unwrap();

        let obs_fresh = env.reset().unwrap();
        assert_eq!(env.state().cash(), 1_000.0);
        assert_eq!(env.state().shares(), &[0.0, 0.0]);
        assert_eq!(env.state().step_index(), 0);
        assert_eq!(obs_fresh, env.observe());
    }

    #[test]
    fn invalid_action_shape_fails_fast() {
        let mut env = scenario_env();
        env.reset().unwrap();
        let result = env.step(Action::from(vec![0.5]));
        assert!(matches!(
            result,
            Err(crate::error::RefolioError::Env(
                EnvError::InvalidActionShape { expected: 2, got: 1 }
            ))
        ));
        // The failed call must not have advanced the simulation.
        assert_eq!(env.state().step_index(), 0);
    }

    // ============================================================================
    // Part 3: Invariants Under Hostile Input
    // ============================================================================

    #[test]
    fn cash_and_holdings_stay_non_negative() {
        let table = PriceTable::builder()
            .with_series(Symbol::new("ALPHA"), vec![100.0, f64::NAN, 0.0, 1e9])
            .with_series(Symbol::new("BETA"), vec![50.0, 45.0, -7.0, 40.0])
            .build()
            .unwrap();
        let mut env =
            Environment::new(table, EnvConfig::default().with_initial_cash(1_000.0)).unwrap();
        env.reset().unwrap();

        for weights in [
            vec![2.0, 2.0],
            vec![-1.0, 1.5],
            vec![f64::NAN, 0.9],
            vec![1.0, 1.0],
        ] {
            let (obs, reward, _, info) = env.step(Action::from(weights)).unwrap();
            assert!(env.state().cash() >= 0.0);
            assert!(env.state().shares().iter().all(|s| *s >= 0.0 && s.is_finite()));
            assert!(reward.0.is_finite());
            assert!(info.portfolio_value.is_finite());
            assert!(obs.values().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn invalid_prices_are_counted_not_raised() {
        let table = PriceTable::builder()
            .with_series(Symbol::new("ALPHA"), vec![f64::NAN, 110.0])
            .with_series(Symbol::new("BETA"), vec![50.0, 45.0])
            .build()
            .unwrap();
        let mut env =
            Environment::new(table, EnvConfig::default().with_initial_cash(1_000.0)).unwrap();
        env.reset().unwrap();
        env.step(Action::from(vec![0.5, 0.5])).unwrap();

        assert!(env.diagnostics().price_substitutions > 0);
    }

    #[test]
    fn degenerate_valuation_falls_back_to_initial_cash() {
        // No cash, no holdings: total value is 0, which would freeze every
        // future trade without the fallback.
        let table = PriceTable::builder()
            .with_series(Symbol::new("ALPHA"), vec![100.0, 110.0])
            .build()
            .unwrap();
        let mut env =
            Environment::new(table, EnvConfig::default().with_initial_cash(0.0)).unwrap();
        env.reset().unwrap();
        env.step(Action::from(vec![1.0])).unwrap();

        assert_eq!(env.diagnostics().valuation_fallbacks, 1);
        // The fallback basis is 0 here, so no shares could actually be bought,
        // but the step completed and state stayed sane.
        assert!(env.state().cash() >= 0.0);
    }

    #[test]
    fn all_zero_action_liquidates_holdings() {
        let table = PriceTable::builder()
            .with_series(Symbol::new("ALPHA"), vec![100.0, 110.0])
            .build()
            .unwrap();
        let holdings = Holdings::try_from_pairs([(Symbol::new("ALPHA"), 5.0)]).unwrap();
        let cfg = EnvConfig::default()
            .with_initial_cash(1_000.0)
            .with_initial_holdings(holdings);
        let mut env = Environment::new(table, cfg).unwrap();
        env.reset().unwrap();

        env.step(Action::from(vec![0.0])).unwrap();

        assert_eq!(env.state().shares(), &[0.0]);
        // Liquidation pays cost on the sold notional: 5 * 100 * 0.001 = 0.5.
        assert_close(env.state().cash(), 999.5);
    }

    // ============================================================================
    // Part 4: Construction
    // ============================================================================

    #[test]
    fn construction_rejects_holdings_for_unknown_assets() {
        let table = PriceTable::builder()
            .with_series(Symbol::new("ALPHA"), vec![100.0])
            .build()
            .unwrap();
        let holdings = Holdings::try_from_pairs([(Symbol::new("GAMMA"), 1.0)]).unwrap();
        let cfg = EnvConfig::default().with_initial_holdings(holdings);

        let result = Environment::new(table, cfg);
        assert!(matches!(
            result,
            Err(crate::error::RefolioError::Data(
                crate::error::DataError::MissingAssetData(_)
            ))
        ));
    }

    #[test]
    fn observation_length_is_three_blocks_per_asset() {
        let env = scenario_env();
        assert_eq!(env.observation_len(), 6);
        assert_eq!(env.observe().len(), 6);
    }

    #[test]
    fn observe_is_idempotent_between_steps() {
        let mut env = scenario_env();
        env.reset().unwrap();
        env.step(Action::from(vec![0.3, 0.4])).unwrap();

        assert_eq!(env.observe(), env.observe());
    }
}
