use serde::Serialize;

use crate::{
    data::domain::Symbol,
    error::RefolioResult,
    gym::{Env, Reward, env::Environment},
    policy::Policy,
};

/// A one-shot target-allocation recommendation: the policy's raw output for
/// the current observation, zipped with asset order. The environment is not
/// stepped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    weights: Vec<(Symbol, f64)>,
}

impl Recommendation {
    pub fn weights(&self) -> &[(Symbol, f64)] {
        &self.weights
    }

    pub fn weight_for(&self, symbol: &Symbol) -> Option<f64> {
        self.weights
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, w)| *w)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Replay result of a full episode: the ordered per-step rewards and their
/// sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backtest {
    pub total_reward: Reward,
    pub rewards: Vec<Reward>,
}

impl Environment {
    /// Resets the environment, produces one observation, and calls the policy
    /// once. The action is returned as target weights per asset, without
    /// stepping.
    #[tracing::instrument(skip(self, policy), fields(policy = policy.identifier()))]
    pub fn recommend<P: Policy>(&mut self, policy: &mut P) -> RefolioResult<Recommendation> {
        let obs = self.reset()?;
        let action = policy.act(&obs)?;
        action.validate_shape(self.asset_count())?;

        let weights = self
            .symbols()
            .iter()
            .cloned()
            .zip(action.weights().iter().copied())
            .collect();

        Ok(Recommendation { weights })
    }

    /// Resets the environment and replays the policy until the price series
    /// is exhausted, collecting every step's reward.
    ///
    /// Strictly sequential: the state at step `t` depends on the committed
    /// state at `t − 1`, so results are identical across runs given a
    /// deterministic policy and price table.
    #[tracing::instrument(skip(self, policy), fields(policy = policy.identifier()))]
    pub fn backtest<P: Policy>(&mut self, policy: &mut P) -> RefolioResult<Backtest> {
        let mut obs = self.reset()?;
        let mut rewards = Vec::with_capacity(self.step_count());

        loop {
            let action = policy.act(&obs)?;
            let (next_obs, reward, outcome, _info) = self.step(action)?;
            rewards.push(reward);
            obs = next_obs;
            if outcome.is_done() {
                break;
            }
        }

        policy.reset();
        tracing::info!(
            steps = rewards.len(),
            total = rewards.iter().copied().sum::<Reward>().0,
            "Backtest complete"
        );

        Ok(Backtest {
            total_reward: rewards.iter().copied().sum(),
            rewards,
        })
    }
}
