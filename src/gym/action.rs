use serde::{Deserialize, Serialize};

use crate::error::{EnvError, RefolioResult};

/// A policy's raw output: one desired post-trade allocation fraction per
/// asset, in asset order. Values are unconstrained in sign and range; the
/// step engine performs all clipping and normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action(Vec<f64>);

impl Action {
    pub fn weights(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Intrinsic validation: the vector must carry exactly one weight per
    /// asset. Fails fast so a training loop sees the mismatch.
    pub fn validate_shape(&self, expected: usize) -> RefolioResult<()> {
        if self.0.len() != expected {
            return Err(EnvError::InvalidActionShape {
                expected,
                got: self.0.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Clips every component to `[0, 1]` (non-finite components become 0) and,
    /// if the sum exceeds 1, rescales the whole vector proportionally so the
    /// sum is exactly 1. A sum below 1 is left alone: the remainder is
    /// unallocated cash intent.
    pub fn sanitize(&self) -> TargetAllocation {
        let mut weights: Vec<f64> = self
            .0
            .iter()
            .map(|w| if w.is_finite() { w.clamp(0.0, 1.0) } else { 0.0 })
            .collect();

        let sum: f64 = weights.iter().sum();
        if sum > 1.0 {
            for weight in &mut weights {
                *weight /= sum;
            }
        }

        TargetAllocation(weights)
    }
}

impl From<Vec<f64>> for Action {
    fn from(weights: Vec<f64>) -> Self {
        Self(weights)
    }
}

/// A sanitized allocation: every weight in `[0, 1]`, summing to at most 1.
/// Only the step engine consumes it; it is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetAllocation(Vec<f64>);

impl TargetAllocation {
    pub fn weights(&self) -> &[f64] {
        &self.0
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}
