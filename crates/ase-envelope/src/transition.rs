//! # State Update Operator
//!
//! The host-owned `apply(S, ΔS) → S'`. The gate never calls it; hosts use it
//! to apply exactly the change the gate returned.

use ase_core::Capabilities;

/// A domain's state-update operator.
pub trait Transition: Capabilities {
    /// The state reached by applying `step` at `state`.
    fn apply(&self, state: &Self::State, step: &Self::Step) -> Self::State;

    /// Whether a materialized state lies inside the admissible domain.
    ///
    /// Hosts use this to audit runs; the gate decides on changes, not states.
    fn is_inside(&self, state: &Self::State) -> bool;
}

impl<T: Transition + ?Sized> Transition for &T {
    fn apply(&self, state: &Self::State, step: &Self::Step) -> Self::State {
        (**self).apply(state, step)
    }

    fn is_inside(&self, state: &Self::State) -> bool {
        (**self).is_inside(state)
    }
}
