//! # Injected Capabilities
//!
//! The engine owns no domain knowledge. Everything it needs to know about
//! states and changes arrives through four capabilities supplied by the
//! caller at construction:
//!
//! | capability | used by |
//! |---|---|
//! | admissibility predicate | every call |
//! | neutral-change provider | every fallback |
//! | scaling function | Scale mode |
//! | projection function | Project mode |
//!
//! Two ways to supply them:
//!
//! - implement [`Capabilities`] on a domain type (the usual route; the
//!   optional capabilities default to [`CapabilityFault::Unavailable`]);
//! - fill a [`Dependencies`] struct with plain function pointers, where any
//!   capability may be left unset.
//!
//! Capabilities must be pure for the engine's determinism and re-entrancy
//! guarantees to hold. Interior mutability inside a capability is the
//! caller's responsibility to serialize.

use crate::error::CapabilityFault;
use crate::finite::Finite;

/// The capability set consumed by the engine.
pub trait Capabilities {
    /// Opaque system state. Borrowed for one call, never retained.
    type State;
    /// Opaque change value.
    type Step: Clone + Finite;

    /// Decide whether `step` applied at `state` stays inside the domain.
    ///
    /// `Err` is an evaluation fault and is treated as "not admissible".
    ///
    /// The engine checks only the change for non-finite values; `State` is
    /// opaque, so rejecting a non-finite or otherwise invalid current state
    /// is this predicate's job.
    fn is_admissible(&self, state: &Self::State, step: &Self::Step)
        -> Result<bool, CapabilityFault>;

    /// The domain's canonical no-op change.
    fn neutral_step(&self) -> Self::Step;

    /// Shrink `step` by factor `k` in (0, 1]. Scale mode only.
    fn scale_step(&self, _step: &Self::Step, _k: f64) -> Result<Self::Step, CapabilityFault> {
        Err(CapabilityFault::Unavailable)
    }

    /// Map `step` onto the nearest admissible alternative. Project mode only.
    fn project_step(
        &self,
        _state: &Self::State,
        _step: &Self::Step,
    ) -> Result<Self::Step, CapabilityFault> {
        Err(CapabilityFault::Unavailable)
    }

    /// Whether the admissibility predicate and neutral provider are present.
    ///
    /// A capability set that reports `false` makes every call return the
    /// neutral change without consulting anything else.
    fn is_wired(&self) -> bool {
        true
    }
}

impl<C: Capabilities + ?Sized> Capabilities for &C {
    type State = C::State;
    type Step = C::Step;

    fn is_admissible(
        &self,
        state: &Self::State,
        step: &Self::Step,
    ) -> Result<bool, CapabilityFault> {
        (**self).is_admissible(state, step)
    }

    fn neutral_step(&self) -> Self::Step {
        (**self).neutral_step()
    }

    fn scale_step(&self, step: &Self::Step, k: f64) -> Result<Self::Step, CapabilityFault> {
        (**self).scale_step(step, k)
    }

    fn project_step(
        &self,
        state: &Self::State,
        step: &Self::Step,
    ) -> Result<Self::Step, CapabilityFault> {
        (**self).project_step(state, step)
    }

    fn is_wired(&self) -> bool {
        (**self).is_wired()
    }
}

// ─── Function-pointer capability set ─────────────────────────────────

/// Admissibility predicate.
pub type AdmissibleFn<S, D> = fn(&S, &D) -> bool;
/// Neutral-change provider.
pub type NeutralFn<D> = fn() -> D;
/// Scaling function. `None` is a transform fault.
pub type ScaleFn<D> = fn(&D, f64) -> Option<D>;
/// Projection function. `None` is a transform fault.
pub type ProjectFn<S, D> = fn(&S, &D) -> Option<D>;

/// A capability set built from plain function pointers.
///
/// Every field is optional. A missing predicate or neutral provider makes
/// the set unwired; the engine then returns the neutral change, falling
/// back to `D::default()` when no provider is set.
pub struct Dependencies<S, D> {
    /// Admissibility predicate.
    pub is_admissible: Option<AdmissibleFn<S, D>>,
    /// Neutral-change provider.
    pub neutral_step: Option<NeutralFn<D>>,
    /// Scaling function.
    pub scale_step: Option<ScaleFn<D>>,
    /// Projection function.
    pub project_step: Option<ProjectFn<S, D>>,
}

impl<S, D> Dependencies<S, D> {
    /// A set with only the two mandatory capabilities.
    pub fn new(is_admissible: AdmissibleFn<S, D>, neutral_step: NeutralFn<D>) -> Self {
        Self {
            is_admissible: Some(is_admissible),
            neutral_step: Some(neutral_step),
            scale_step: None,
            project_step: None,
        }
    }

    /// Attach a scaling function.
    pub fn with_scale(mut self, scale_step: ScaleFn<D>) -> Self {
        self.scale_step = Some(scale_step);
        self
    }

    /// Attach a projection function.
    pub fn with_project(mut self, project_step: ProjectFn<S, D>) -> Self {
        self.project_step = Some(project_step);
        self
    }
}

impl<S, D> Default for Dependencies<S, D> {
    fn default() -> Self {
        Self {
            is_admissible: None,
            neutral_step: None,
            scale_step: None,
            project_step: None,
        }
    }
}

impl<S, D> Clone for Dependencies<S, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, D> Copy for Dependencies<S, D> {}

impl<S, D> std::fmt::Debug for Dependencies<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("is_admissible", &self.is_admissible.is_some())
            .field("neutral_step", &self.neutral_step.is_some())
            .field("scale_step", &self.scale_step.is_some())
            .field("project_step", &self.project_step.is_some())
            .finish()
    }
}

impl<S, D> Capabilities for Dependencies<S, D>
where
    D: Clone + Default + Finite,
{
    type State = S;
    type Step = D;

    fn is_admissible(&self, state: &S, step: &D) -> Result<bool, CapabilityFault> {
        self.is_admissible
            .map(|f| f(state, step))
            .ok_or(CapabilityFault::Unavailable)
    }

    fn neutral_step(&self) -> D {
        self.neutral_step.map(|f| f()).unwrap_or_default()
    }

    fn scale_step(&self, step: &D, k: f64) -> Result<D, CapabilityFault> {
        let f = self.scale_step.ok_or(CapabilityFault::Unavailable)?;
        f(step, k).ok_or(CapabilityFault::Rejected("scale function produced no value"))
    }

    fn project_step(&self, state: &S, step: &D) -> Result<D, CapabilityFault> {
        let f = self.project_step.ok_or(CapabilityFault::Unavailable)?;
        f(state, step).ok_or(CapabilityFault::Rejected("projection function produced no value"))
    }

    fn is_wired(&self) -> bool {
        self.is_admissible.is_some() && self.neutral_step.is_some()
    }
}
