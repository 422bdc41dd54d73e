use crate::{error::RefolioResult, gym::action::Action, gym::observation::Observation};

pub mod baseline;

/// The external decision function mapping observations to actions.
///
/// A trained policy artifact is an opaque input to this crate; the simulation
/// treats any implementation as a black box. Implementations should be
/// side-effect free per call. The call may sit on a live request path, so a
/// production wrapper should bound its latency.
pub trait Policy {
    /// Decide on a target allocation for the current observation.
    fn act(&mut self, obs: &Observation) -> RefolioResult<Action>;

    /// Policy name for logging/debugging.
    fn identifier(&self) -> &str {
        "unnamed"
    }

    /// Reset internal state at the end of an episode. Default is no-op.
    fn reset(&mut self) {}
}

impl Policy for Box<dyn Policy> {
    fn act(&mut self, obs: &Observation) -> RefolioResult<Action> {
        (**self).act(obs)
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
