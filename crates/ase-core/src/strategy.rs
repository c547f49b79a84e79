//! # Enforcement Strategies
//!
//! One strategy per [`Mode`](crate::Mode). A strategy runs only after the
//! proposal has already failed admissibility. It returns `Some(candidate)`
//! with a change that passed a fresh admissibility check, or `None` when the
//! engine must fall back to the neutral change.

use crate::capability::Capabilities;
use crate::config::Config;
use crate::finite::Finite;

/// Finite and admitted by the predicate. Evaluation faults count as "no".
pub(crate) fn admits<C: Capabilities>(caps: &C, state: &C::State, step: &C::Step) -> bool {
    step.is_finite() && caps.is_admissible(state, step).unwrap_or(false)
}

/// Reject: never substitutes.
pub(crate) fn reject<C: Capabilities>() -> Option<C::Step> {
    None
}

/// Scale: geometric shrink `k = 1, f, f², ...` for at most
/// `max_scale_attempts` candidates.
///
/// A transform fault or a non-finite candidate ends the search immediately.
pub(crate) fn scale<C: Capabilities>(
    caps: &C,
    config: &Config,
    state: &C::State,
    proposed: &C::Step,
) -> Option<C::Step> {
    let factor = config.scale_factor.get();
    let mut k = 1.0_f64;

    for _ in 0..config.max_scale_attempts {
        let candidate = caps.scale_step(proposed, k).ok()?;
        if !candidate.is_finite() {
            return None;
        }
        if admits(caps, state, &candidate) {
            return Some(candidate);
        }
        k *= factor;
    }

    None
}

/// Project: one projection, one verification, no retry.
pub(crate) fn project<C: Capabilities>(
    caps: &C,
    state: &C::State,
    proposed: &C::Step,
) -> Option<C::Step> {
    let projected = caps.project_step(state, proposed).ok()?;
    admits(caps, state, &projected).then_some(projected)
}
