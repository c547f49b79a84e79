//! # Learning-State Envelope
//!
//! Gate for an optimizer loop whose state is more than the parameters. The
//! proposed change is only `Δθ`; the rest of the state is derived from it.
//!
//! ## Dynamics
//!
//! ```text
//! θ'    = θ + Δθ
//! m'    = b1 · m + (1 - b1) · Δθ          (with Adam moments)
//! v'    = max(b2 · v + (1 - b2) · Δθ², 0)  (with Adam moments)
//! ema'  = β · ema + (1 - β) · θ'
//! step' = step + 1
//! ```
//!
//! Without [`AdamParams`] the moment vectors are carried unchanged and take
//! no part in validity.
//!
//! ## Admissible Domain
//!
//! A materialized state is valid iff every component is finite and
//!
//! - `‖θ‖₂ ≤ theta_radius`
//! - `‖ema‖₂ ≤ ema_radius`
//! - `‖ema - θ‖₂ ≤ gap_radius`
//! - `θᵢ ≥ 0` for `i < sign_preserve`
//! - with Adam moments: `‖m‖₂ ≤ m_radius`, `‖v‖₂ ≤ v_radius`, `vᵢ ≥ 0`
//!
//! (all relaxed by `tolerance`). A change is admissible iff the current
//! state is valid, `Δθ` is finite (and within `max_step_inf` per component
//! when set), the derived next state is valid, and its counter is exactly
//! `step + 1`.
//!
//! The neutral change `Δθ = 0` leaves θ untouched while the derived EMA,
//! moments and counter still advance; the EMA moves toward θ and both
//! moments decay, so the derived state stays inside the envelope.
//!
//! ## Projection
//!
//! 1. Clamp the sign-preserved prefix of `θ'` and shrink it onto the θ-ball.
//! 2. If the derived gap exceeds `gap_radius`, mix once toward the current
//!    EMA: `θ' ← α·θ' + (1-α)·ema`, `α = clamp(gap_radius / gap, 0, 1)`,
//!    then re-clamp.
//! 3. If that is still inadmissible (e.g. the per-component bound or a
//!    moment bound), bisect a scalar `k ∈ [0, 1]` on the original proposal
//!    for a fixed number of rounds.
//!
//! The projection verifies its own output and reports a fault otherwise.

use serde::{Deserialize, Serialize};

use ase_core::{Capabilities, CapabilityFault};

use crate::ball::{zero_non_finite, DEFAULT_TOLERANCE};
use crate::error::{decay, non_negative, positive, EnvelopeError};
use crate::transition::Transition;
use crate::vector;

/// Bisection rounds of the projection fallback.
const BISECTION_ROUNDS: usize = 24;

/// Adam first/second moment tracking and its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdamParams {
    /// First-moment decay, in `[0, 1)`.
    pub b1: f64,
    /// Second-moment decay, in `[0, 1)`.
    pub b2: f64,
    /// Bound on `‖m‖₂`.
    pub m_radius: f64,
    /// Bound on `‖v‖₂`.
    pub v_radius: f64,
}

impl Default for AdamParams {
    fn default() -> Self {
        Self {
            b1: 0.9,
            b2: 0.999,
            m_radius: 10.0,
            v_radius: 10.0,
        }
    }
}

impl AdamParams {
    fn validate(&self) -> Result<(), EnvelopeError> {
        decay("adam.b1", self.b1)?;
        decay("adam.b2", self.b2)?;
        positive("adam.m_radius", self.m_radius)?;
        positive("adam.v_radius", self.v_radius)?;
        Ok(())
    }

    fn next_m(&self, m: &[f64], dtheta: &[f64]) -> Vec<f64> {
        m.iter()
            .zip(dtheta)
            .map(|(m, d)| self.b1 * m + (1.0 - self.b1) * d)
            .collect()
    }

    fn next_v(&self, v: &[f64], dtheta: &[f64]) -> Vec<f64> {
        v.iter()
            .zip(dtheta)
            .map(|(v, d)| {
                let x = self.b2 * v + (1.0 - self.b2) * (d * d);
                // NaN passes through to fail validity.
                if x < 0.0 {
                    0.0
                } else {
                    x
                }
            })
            .collect()
    }
}

/// Parameters of a [`LearningEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LearningParams {
    /// Parameter vector dimension.
    pub dim: usize,
    /// Bound on `‖θ‖₂`.
    pub theta_radius: f64,
    /// Bound on `‖ema‖₂`.
    pub ema_radius: f64,
    /// Bound on `‖ema - θ‖₂`.
    pub gap_radius: f64,
    /// Length of the non-negative prefix of θ.
    #[serde(default)]
    pub sign_preserve: usize,
    /// EMA decay, in `[0, 1)`.
    pub beta: f64,
    /// Constraint slack.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Optional bound on `‖Δθ‖∞`.
    #[serde(default)]
    pub max_step_inf: Option<f64>,
    /// Optional Adam moments.
    #[serde(default)]
    pub adam: Option<AdamParams>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            dim: 256,
            theta_radius: 5.0,
            ema_radius: 5.0,
            gap_radius: 2.0,
            sign_preserve: 8,
            beta: 0.98,
            tolerance: DEFAULT_TOLERANCE,
            max_step_inf: None,
            adam: None,
        }
    }
}

/// Optimizer state: parameters, their EMA, Adam moments and the step counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    /// Parameters.
    pub theta: Vec<f64>,
    /// Exponential moving average of the parameters.
    pub ema: Vec<f64>,
    /// Adam first moment.
    #[serde(default)]
    pub m: Vec<f64>,
    /// Adam second moment.
    #[serde(default)]
    pub v: Vec<f64>,
    /// Number of applied steps.
    pub step: u64,
}

impl LearningState {
    /// State at step zero with the EMA equal to θ and zero moments.
    pub fn new(theta: Vec<f64>) -> Self {
        let dim = theta.len();
        Self {
            ema: theta.clone(),
            theta,
            m: vec![0.0; dim],
            v: vec![0.0; dim],
            step: 0,
        }
    }
}

/// Envelope over [`LearningState`].
#[derive(Debug, Clone, PartialEq)]
pub struct LearningEnvelope {
    params: LearningParams,
}

impl LearningEnvelope {
    /// Validate parameters and build the envelope.
    pub fn new(params: LearningParams) -> Result<Self, EnvelopeError> {
        if params.dim == 0 {
            return Err(EnvelopeError::ZeroDimension);
        }
        if params.sign_preserve > params.dim {
            return Err(EnvelopeError::SignPrefixTooLong {
                prefix: params.sign_preserve,
                dim: params.dim,
            });
        }
        positive("theta_radius", params.theta_radius)?;
        positive("ema_radius", params.ema_radius)?;
        positive("gap_radius", params.gap_radius)?;
        non_negative("tolerance", params.tolerance)?;
        decay("beta", params.beta)?;
        if let Some(bound) = params.max_step_inf {
            positive("max_step_inf", bound)?;
        }
        if let Some(adam) = &params.adam {
            adam.validate()?;
        }
        Ok(Self { params })
    }

    /// The validated parameters.
    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    /// Derive the next state from `Δθ`.
    ///
    /// The counter saturates at `u64::MAX`; such a transition is never
    /// admissible.
    pub fn derive_next(&self, state: &LearningState, dtheta: &[f64]) -> LearningState {
        let theta = vector::add(&state.theta, dtheta);
        let ema = self.next_ema(&state.ema, &theta);
        let (m, v) = match &self.params.adam {
            Some(adam) => (adam.next_m(&state.m, dtheta), adam.next_v(&state.v, dtheta)),
            None => (state.m.clone(), state.v.clone()),
        };
        LearningState {
            theta,
            ema,
            m,
            v,
            step: state.step.saturating_add(1),
        }
    }

    fn next_ema(&self, ema: &[f64], theta_next: &[f64]) -> Vec<f64> {
        let b = self.params.beta;
        ema.iter()
            .zip(theta_next)
            .map(|(e, t)| b * e + (1.0 - b) * t)
            .collect()
    }

    /// Whether a materialized state satisfies every envelope constraint.
    pub fn is_valid(&self, s: &LearningState) -> bool {
        let p = &self.params;
        if s.theta.len() != p.dim || s.ema.len() != p.dim {
            return false;
        }
        if !vector::all_finite(&s.theta) || !vector::all_finite(&s.ema) {
            return false;
        }

        let within = |value: f64, bound: f64| value.is_finite() && value <= bound + p.tolerance;
        if !within(vector::l2_norm(&s.theta), p.theta_radius)
            || !within(vector::l2_norm(&s.ema), p.ema_radius)
            || !within(vector::l2_distance(&s.ema, &s.theta), p.gap_radius)
        {
            return false;
        }

        if let Some(adam) = &p.adam {
            if s.m.len() != p.dim || s.v.len() != p.dim {
                return false;
            }
            if !vector::all_finite(&s.m) || !vector::all_finite(&s.v) {
                return false;
            }
            if !within(vector::l2_norm(&s.m), adam.m_radius)
                || !within(vector::l2_norm(&s.v), adam.v_radius)
                || s.v.iter().any(|x| *x < -p.tolerance)
            {
                return false;
            }
        }

        s.theta
            .iter()
            .take(p.sign_preserve)
            .all(|x| *x >= -p.tolerance)
    }

    /// Repair an arbitrary starting state into the envelope.
    ///
    /// θ is repaired like a norm-ball state and the EMA restarts at θ. Adam
    /// moments lose non-finite components, `v` is clamped non-negative, and
    /// both are shrunk onto their balls. If the result is still invalid, the
    /// whole state resets to the origin at step zero.
    pub fn clamp_into(&self, mut state: LearningState) -> Result<LearningState, EnvelopeError> {
        let p = &self.params;
        if state.theta.len() != p.dim {
            return Err(EnvelopeError::DimensionMismatch {
                expected: p.dim,
                actual: state.theta.len(),
            });
        }

        let repaired = zero_non_finite(&mut state.theta);
        if repaired > 0 {
            tracing::warn!(repaired, "non-finite theta components reset to zero");
        }
        vector::clamp_sign_prefix(&mut state.theta, p.sign_preserve);
        vector::project_onto_ball(&mut state.theta, p.theta_radius);

        state.ema = state.theta.clone();
        vector::project_onto_ball(&mut state.ema, p.ema_radius);

        if state.m.len() != p.dim {
            state.m = vec![0.0; p.dim];
        }
        if state.v.len() != p.dim {
            state.v = vec![0.0; p.dim];
        }
        if let Some(adam) = &p.adam {
            let repaired = zero_non_finite(&mut state.m) + zero_non_finite(&mut state.v);
            if repaired > 0 {
                tracing::warn!(repaired, "non-finite moment components reset to zero");
            }
            state.v.iter_mut().filter(|x| **x < 0.0).for_each(|x| *x = 0.0);
            vector::project_onto_ball(&mut state.m, adam.m_radius);
            vector::project_onto_ball(&mut state.v, adam.v_radius);
        }

        if !self.is_valid(&state) {
            tracing::warn!("learning state could not be repaired in place; resetting to origin");
            state = LearningState::new(vec![0.0; p.dim]);
        }
        Ok(state)
    }

    fn check_step(&self, dtheta: &[f64]) -> Result<bool, CapabilityFault> {
        if dtheta.len() != self.params.dim {
            return Err(CapabilityFault::Rejected("step dimension mismatch"));
        }
        if !vector::all_finite(dtheta) {
            return Err(CapabilityFault::NonFinite);
        }
        Ok(match self.params.max_step_inf {
            Some(bound) => vector::max_abs(dtheta) <= bound + self.params.tolerance,
            None => true,
        })
    }

    fn admissible(&self, state: &LearningState, dtheta: &[f64]) -> Result<bool, CapabilityFault> {
        if !self.is_valid(state) {
            return Ok(false);
        }
        if !self.check_step(dtheta)? {
            return Ok(false);
        }
        let Some(expected) = state.step.checked_add(1) else {
            return Ok(false);
        };
        let next = self.derive_next(state, dtheta);
        Ok(next.step == expected && self.is_valid(&next))
    }

    /// Sign clamp, θ-ball, one gap-repair mix.
    fn repair(&self, state: &LearningState, dtheta: &[f64]) -> Result<Vec<f64>, CapabilityFault> {
        let p = &self.params;

        let mut theta_next = vector::add(&state.theta, dtheta);
        vector::clamp_sign_prefix(&mut theta_next, p.sign_preserve);
        vector::project_onto_ball(&mut theta_next, p.theta_radius);

        let gap = vector::l2_distance(&self.next_ema(&state.ema, &theta_next), &theta_next);
        if !gap.is_finite() {
            return Err(CapabilityFault::NonFinite);
        }
        if gap > p.gap_radius && gap > 0.0 {
            let alpha = (p.gap_radius / gap).clamp(0.0, 1.0);
            theta_next = theta_next
                .iter()
                .zip(&state.ema)
                .map(|(t, e)| alpha * t + (1.0 - alpha) * e)
                .collect();
            vector::clamp_sign_prefix(&mut theta_next, p.sign_preserve);
            vector::project_onto_ball(&mut theta_next, p.theta_radius);
        }

        Ok(vector::sub(&theta_next, &state.theta))
    }

    /// Largest `k ∈ [0, 1]` found by bisection with `k · Δθ` admissible.
    fn bisect(&self, state: &LearningState, dtheta: &[f64]) -> Result<Vec<f64>, CapabilityFault> {
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        for _ in 0..BISECTION_ROUNDS {
            let mid = 0.5 * (lo + hi);
            if self.admissible(state, &vector::scaled(dtheta, mid))? {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(vector::scaled(dtheta, lo))
    }
}

impl Capabilities for LearningEnvelope {
    type State = LearningState;
    type Step = Vec<f64>;

    fn is_admissible(
        &self,
        state: &LearningState,
        step: &Vec<f64>,
    ) -> Result<bool, CapabilityFault> {
        self.admissible(state, step)
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
        state: &LearningState,
        step: &Vec<f64>,
    ) -> Result<Vec<f64>, CapabilityFault> {
        if !self.is_valid(state) {
            return Err(CapabilityFault::Rejected("current state outside envelope"));
        }
        self.check_step(step)?;

        let repaired = self.repair(state, step)?;
        if self.admissible(state, &repaired)? {
            return Ok(repaired);
        }

        let shrunk = self.bisect(state, step)?;
        if self.admissible(state, &shrunk)? {
            Ok(shrunk)
        } else {
            Err(CapabilityFault::Rejected("projection left the envelope"))
        }
    }
}

impl Transition for LearningEnvelope {
    fn apply(&self, state: &LearningState, step: &Vec<f64>) -> LearningState {
        self.derive_next(state, step)
    }

    fn is_inside(&self, state: &LearningState) -> bool {
        self.is_valid(state)
    }
}
