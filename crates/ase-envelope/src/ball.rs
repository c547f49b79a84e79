//! # Norm-Ball Envelope
//!
//! Vector domain for parameter updates: `θ ∈ ℝⁿ`, `apply(θ, Δθ) = θ + Δθ`.
//!
//! ## Admissible Domain
//!
//! A state θ is inside the envelope iff:
//!
//! 1. every component is finite,
//! 2. `‖θ‖₂ ≤ radius`,
//! 3. `θᵢ ≥ 0` for every `i < sign_preserve`,
//!
//! with both inequalities relaxed by `tolerance`. A change is admissible iff
//! the current state is inside, the change is finite with the envelope's
//! dimension, and `θ + Δθ` is inside.
//!
//! ## Projection
//!
//! Clamp the sign-preserved prefix of `θ + Δθ` to zero, then shrink
//! radially onto the ball. Both operations keep the other constraint
//! satisfied, so the result is inside whenever θ is.

use serde::{Deserialize, Serialize};

use ase_core::{Capabilities, CapabilityFault};

use crate::error::{non_negative, positive, EnvelopeError};
use crate::transition::Transition;
use crate::vector;

/// Default constraint slack.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Parameters of a [`NormBall`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormBallParams {
    /// Vector dimension.
    pub dim: usize,
    /// Ball radius.
    pub radius: f64,
    /// Length of the non-negative prefix.
    #[serde(default)]
    pub sign_preserve: usize,
    /// Constraint slack.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for NormBallParams {
    fn default() -> Self {
        Self {
            dim: 128,
            radius: 5.0,
            sign_preserve: 8,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// L2-ball envelope with a sign-preserved prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct NormBall {
    params: NormBallParams,
}

impl NormBall {
    /// Validate parameters and build the envelope.
    pub fn new(params: NormBallParams) -> Result<Self, EnvelopeError> {
        if params.dim == 0 {
            return Err(EnvelopeError::ZeroDimension);
        }
        if params.sign_preserve > params.dim {
            return Err(EnvelopeError::SignPrefixTooLong {
                prefix: params.sign_preserve,
                dim: params.dim,
            });
        }
        positive("radius", params.radius)?;
        non_negative("tolerance", params.tolerance)?;
        Ok(Self { params })
    }

    /// The validated parameters.
    pub fn params(&self) -> &NormBallParams {
        &self.params
    }

    /// Vector dimension.
    pub fn dim(&self) -> usize {
        self.params.dim
    }

    /// Whether `theta` lies inside the envelope.
    pub fn contains(&self, theta: &[f64]) -> bool {
        let p = &self.params;
        if theta.len() != p.dim || !vector::all_finite(theta) {
            return false;
        }
        let n = vector::l2_norm(theta);
        if !n.is_finite() || n > p.radius + p.tolerance {
            return false;
        }
        theta
            .iter()
            .take(p.sign_preserve)
            .all(|x| *x >= -p.tolerance)
    }

    /// Repair an arbitrary starting state into the envelope.
    ///
    /// Non-finite components become zero, the sign-preserved prefix is
    /// clamped, and the vector is shrunk onto the ball.
    pub fn clamp_into(&self, mut theta: Vec<f64>) -> Result<Vec<f64>, EnvelopeError> {
        self.check_dim(&theta)?;

        let repaired = zero_non_finite(&mut theta);
        if repaired > 0 {
            tracing::warn!(repaired, "non-finite state components reset to zero");
        }
        vector::clamp_sign_prefix(&mut theta, self.params.sign_preserve);
        vector::project_onto_ball(&mut theta, self.params.radius);

        if !self.contains(&theta) {
            tracing::warn!("state could not be repaired in place; resetting to origin");
            return Ok(vec![0.0; self.params.dim]);
        }
        Ok(theta)
    }

    fn check_dim(&self, v: &[f64]) -> Result<(), EnvelopeError> {
        if v.len() == self.params.dim {
            Ok(())
        } else {
            Err(EnvelopeError::DimensionMismatch {
                expected: self.params.dim,
                actual: v.len(),
            })
        }
    }

    fn check_step(&self, step: &[f64]) -> Result<(), CapabilityFault> {
        if step.len() != self.params.dim {
            return Err(CapabilityFault::Rejected("step dimension mismatch"));
        }
        if !vector::all_finite(step) {
            return Err(CapabilityFault::NonFinite);
        }
        Ok(())
    }
}

/// Zero every non-finite component; returns how many were replaced.
pub(crate) fn zero_non_finite(v: &mut [f64]) -> usize {
    let mut count = 0;
    for x in v.iter_mut().filter(|x| !x.is_finite()) {
        *x = 0.0;
        count += 1;
    }
    count
}

impl Capabilities for NormBall {
    type State = Vec<f64>;
    type Step = Vec<f64>;

    fn is_admissible(
        &self,
        state: &Vec<f64>,
        step: &Vec<f64>,
    ) -> Result<bool, CapabilityFault> {
        if !self.contains(state) {
            return Ok(false);
        }
        self.check_step(step)?;
        Ok(self.contains(&vector::add(state, step)))
    }

    fn neutral_step(&self) -> Vec<f64> {
        vec![0.0; self.params.dim]
    }

    fn scale_step(&self, step: &Vec<f64>, k: f64) -> Result<Vec<f64>, CapabilityFault> {
        if !k.is_finite() {
            return Err(CapabilityFault::NonFinite);
        }
        let out = vector::scaled(step, k);
        if vector::all_finite(&out) {
            Ok(out)
        } else {
            Err(CapabilityFault::NonFinite)
        }
    }

    fn project_step(
        &self,
        state: &Vec<f64>,
        step: &Vec<f64>,
    ) -> Result<Vec<f64>, CapabilityFault> {
        if !self.contains(state) {
            return Err(CapabilityFault::Rejected("current state outside envelope"));
        }
        self.check_step(step)?;

        let mut next = vector::add(state, step);
        if !vector::all_finite(&next) {
            return Err(CapabilityFault::NonFinite);
        }
        vector::clamp_sign_prefix(&mut next, self.params.sign_preserve);
        vector::project_onto_ball(&mut next, self.params.radius);

        Ok(vector::sub(&next, state))
    }
}

impl Transition for NormBall {
    fn apply(&self, state: &Vec<f64>, step: &Vec<f64>) -> Vec<f64> {
        vector::add(state, step)
    }

    fn is_inside(&self, state: &Vec<f64>) -> bool {
        self.contains(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ase_core::{Config, Engine, Mode, Status};

    fn ball(dim: usize, sign_preserve: usize) -> NormBall {
        NormBall::new(NormBallParams {
            dim,
            radius: 5.0,
            sign_preserve,
            tolerance: DEFAULT_TOLERANCE,
        })
        .unwrap()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn test_rejects_invalid_params() {
        let base = NormBallParams::default();
        assert_eq!(
            NormBall::new(NormBallParams { dim: 0, ..base }),
            Err(EnvelopeError::ZeroDimension)
        );
        assert!(matches!(
            NormBall::new(NormBallParams { sign_preserve: 200, ..base }),
            Err(EnvelopeError::SignPrefixTooLong { .. })
        ));
        assert!(NormBall::new(NormBallParams { radius: 0.0, ..base }).is_err());
        assert!(NormBall::new(NormBallParams { radius: f64::NAN, ..base }).is_err());
        assert!(NormBall::new(NormBallParams { tolerance: -1.0, ..base }).is_err());
        assert!(NormBall::new(base).is_ok());
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let p: NormBallParams = serde_json::from_str(r#"{"dim":4,"radius":2.0}"#).unwrap();
        assert_eq!(p.sign_preserve, 0);
        assert_eq!(p.tolerance, DEFAULT_TOLERANCE);
    }

    // ── Membership ───────────────────────────────────────────────────

    #[test]
    fn test_contains() {
        let b = ball(3, 1);
        assert!(b.contains(&[1.0, 2.0, 2.0]));
        assert!(!b.contains(&[3.0, 4.0, 1.0]));
        assert!(!b.contains(&[-0.5, 0.0, 0.0]));
        assert!(!b.contains(&[0.0, f64::NAN, 0.0]));
        assert!(!b.contains(&[0.0, 0.0]));
    }

    #[test]
    fn test_clamp_into_repairs_state() {
        let b = ball(3, 1);
        let theta = b.clamp_into(vec![-1.0, f64::INFINITY, 10.0]).unwrap();
        assert!(b.contains(&theta));
        assert_eq!(theta[0], 0.0);
        assert_eq!(theta[1], 0.0);
        assert!((theta[2] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_into_checks_dimension() {
        let b = ball(3, 1);
        assert_eq!(
            b.clamp_into(vec![0.0; 2]),
            Err(EnvelopeError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    // ── Capabilities ─────────────────────────────────────────────────

    #[test]
    fn test_admissibility() {
        let b = ball(2, 1);
        let theta = vec![3.0, 0.0];
        assert_eq!(b.is_admissible(&theta, &vec![1.0, 1.0]), Ok(true));
        assert_eq!(b.is_admissible(&theta, &vec![3.0, 0.0]), Ok(false));
        assert_eq!(b.is_admissible(&theta, &vec![-4.0, 0.0]), Ok(false));
        assert_eq!(
            b.is_admissible(&theta, &vec![f64::NAN, 0.0]),
            Err(CapabilityFault::NonFinite)
        );
        assert!(b.is_admissible(&theta, &vec![0.0]).is_err());
        assert_eq!(b.is_admissible(&vec![9.0, 0.0], &vec![-5.0, 0.0]), Ok(false));
    }

    #[test]
    fn test_projection_lands_inside() {
        let b = ball(2, 1);
        let theta = vec![3.0, 0.0];
        let step = b.project_step(&theta, &vec![-10.0, 10.0]).unwrap();
        let next = b.apply(&theta, &step);
        assert!(b.contains(&next));
        assert_eq!(next[0], 0.0);
        assert!((next[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_is_a_no_op() {
        let b = ball(4, 2);
        let theta = vec![0.5, 1.0, -1.0, 2.0];
        let once = b.apply(&theta, &b.neutral_step());
        assert_eq!(once, theta);
        assert_eq!(b.apply(&once, &b.neutral_step()), theta);
    }

    #[test]
    fn test_engine_keeps_state_inside_in_every_mode() {
        let b = ball(2, 1);
        let theta = vec![4.0, 2.0];
        for mode in Mode::ALL {
            let engine = Engine::new(Config::with_mode(mode), &b);
            let out = engine.enforce_with_status(&theta, &vec![5.0, 5.0]);
            assert!(b.contains(&b.apply(&theta, &out.step)), "mode {mode}");
            assert_ne!(out.status, Status::PassThrough);
        }
    }
}
