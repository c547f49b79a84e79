//! # Bounded Scalar Interval
//!
//! One-dimensional additive domain: state and change are `f64`,
//! `apply(s, d) = s + d`, and a change is admissible iff the next state
//! stays in `[-limit, limit]`.
//!
//! ```text
//! admissible(s, d)  ⇔  s, d, s + d finite  ∧  |s + d| ≤ limit
//! neutral           =  0.0
//! scale(d, k)       =  k · d
//! project(s, d)     =  clamp(s + d, -limit, limit) - s
//! ```

use ase_core::{Capabilities, CapabilityFault};

use crate::error::{positive, EnvelopeError};
use crate::transition::Transition;

/// Scalar interval `[-limit, limit]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedScalar {
    limit: f64,
}

impl BoundedScalar {
    /// Interval `[-limit, limit]`. The limit must be finite and positive.
    pub fn new(limit: f64) -> Result<Self, EnvelopeError> {
        Ok(Self {
            limit: positive("limit", limit)?,
        })
    }

    /// The interval `[-1, 1]`.
    pub fn unit() -> Self {
        Self { limit: 1.0 }
    }

    /// Half-width of the interval.
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Whether a state lies inside the interval.
    pub fn contains(&self, state: f64) -> bool {
        state.is_finite() && state.abs() <= self.limit
    }
}

impl Default for BoundedScalar {
    fn default() -> Self {
        Self::unit()
    }
}

impl Capabilities for BoundedScalar {
    type State = f64;
    type Step = f64;

    fn is_admissible(&self, state: &f64, step: &f64) -> Result<bool, CapabilityFault> {
        let next = state + step;
        if !state.is_finite() || !step.is_finite() || !next.is_finite() {
            return Err(CapabilityFault::NonFinite);
        }
        Ok(next.abs() <= self.limit)
    }

    fn neutral_step(&self) -> f64 {
        0.0
    }

    fn scale_step(&self, step: &f64, k: f64) -> Result<f64, CapabilityFault> {
        let out = step * k;
        if out.is_finite() {
            Ok(out)
        } else {
            Err(CapabilityFault::NonFinite)
        }
    }

    fn project_step(&self, state: &f64, step: &f64) -> Result<f64, CapabilityFault> {
        let next = state + step;
        if !state.is_finite() || !next.is_finite() {
            return Err(CapabilityFault::NonFinite);
        }
        let out = next.clamp(-self.limit, self.limit) - state;
        if out.is_finite() {
            Ok(out)
        } else {
            Err(CapabilityFault::NonFinite)
        }
    }
}

impl Transition for BoundedScalar {
    fn apply(&self, state: &f64, step: &f64) -> f64 {
        state + step
    }

    fn is_inside(&self, state: &f64) -> bool {
        self.contains(*state)
    }
}
