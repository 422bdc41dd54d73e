use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    error::RefolioResult,
    gym::{action::Action, observation::Observation},
    policy::Policy,
};

// ================================================================================================
// Equal Weight
// ================================================================================================

/// Allocates `1/n` of the portfolio to every asset, each step.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeight;

impl Policy for EqualWeight {
    fn act(&mut self, obs: &Observation) -> RefolioResult<Action> {
        let n = obs.asset_count();
        Ok(Action::from(vec![1.0 / n as f64; n]))
    }

    fn identifier(&self) -> &str {
        "equal_weight"
    }
}

// ================================================================================================
// Hold Current
// ================================================================================================

/// Re-emits the currently observed weights as the target allocation, so the
/// engine plans no trades beyond what price drift forces.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldCurrent;

impl Policy for HoldCurrent {
    fn act(&mut self, obs: &Observation) -> RefolioResult<Action> {
        Ok(Action::from(obs.weights().to_vec()))
    }

    fn identifier(&self) -> &str {
        "hold_current"
    }
}

// ================================================================================================
// Random
// ================================================================================================

/// Uniform random weights in `[0, 1)` per asset; the environment's sanitation
/// rescales oversubscribed draws. Seeded for reproducible runs.
#[derive(Debug, Clone)]
pub struct Random {
    rng: StdRng,
    seed: u64,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Policy for Random {
    fn act(&mut self, obs: &Observation) -> RefolioResult<Action> {
        let weights = (0..obs.asset_count())
            .map(|_| self.rng.random_range(0.0..1.0))
            .collect::<Vec<_>>();
        Ok(Action::from(weights))
    }

    fn identifier(&self) -> &str {
        "random"
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}
