use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
    error::RefolioResult,
    gym::{action::Action, observation::Observation},
    impl_add_sub_sum_primitive, impl_from_primitive,
};

pub mod action;
pub mod config;
pub mod env;
pub mod execution;
pub mod observation;
pub mod state;

/// Mark-to-market step reward in the quote currency.
///
/// `reward = value(t) − value(t − 1)`: plain P&L, not risk-adjusted and not
/// benchmark-relative. A non-finite intermediate is reported as `Reward(0.0)`
/// rather than propagated.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Reward(pub f64);
impl_from_primitive!(Reward, f64);
impl_add_sub_sum_primitive!(Reward, f64);

/// Represents the lifecycle status of the simulation environment.
///
/// # Lifecycle
///
/// The environment follows a small finite state machine. Stepping outside
/// `Running` returns an error instead of silently advancing.
///
/// ```md
/// Current State                    | Action  | Next State | Notes
/// ---------------------------------|---------|------------|--------------------------------
/// `Running` (price series left)    | step()  | Running    | Continue within the episode
/// `Running` (series exhausted)     | step()  | Done       | Episode terminates
/// `Ready` / `Running` / `Done`     | reset() | Running    | Restart from the initial state
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStatus {
    /// Initial state. The environment is waiting for `reset()` to be called.
    Ready,

    /// The episode is active and the environment accepts `step()` calls.
    Running,

    /// The price series is exhausted. A call to `reset()` starts over.
    Done,
}

impl EnvStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Outcome of a single committed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StepOutcome {
    InProgress,
    /// The step counter reached the number of available price steps.
    Done,
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Auxiliary facts about a committed step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Realized mark-to-market portfolio value after the step, sanitized to 0
    /// if non-finite.
    pub portfolio_value: f64,
}

/// The Gym-like contract the simulation exposes to a policy.
pub trait Env {
    /// Restores the initial portfolio state and returns the first observation.
    fn reset(&mut self) -> RefolioResult<Observation>;

    /// Applies a target-allocation action, advances one step, and reports the
    /// new observation, the step reward, the termination outcome, and the
    /// realized portfolio value.
    fn step(&mut self, action: Action)
    -> RefolioResult<(Observation, Reward, StepOutcome, StepInfo)>;
}
