//! # Enforcement Engine
//!
//! The single operation of this crate:
//!
//! ```text
//! effective = engine.enforce(state, proposed)
//! ```
//!
//! ## Control Flow
//!
//! ```text
//! capabilities unwired ──────────────────────────────▶ neutral
//! admissible(state, proposed) ───────────────────────▶ proposed (unchanged)
//! otherwise, by configured mode:
//!     Reject  ───────────────────────────────────────▶ neutral
//!     Scale   ── k = 1, f, f², ... (≤ max attempts) ─▶ first admissible, else neutral
//!     Project ── project once, verify ───────────────▶ projection, else neutral
//! ```
//!
//! ## Guarantees
//!
//! - Total: every input produces a change. Capability faults, non-finite
//!   values and exhausted attempts all become the neutral change.
//! - Bounded: at most `1 + max_scale_attempts` admissibility evaluations in
//!   Scale mode, two in Project mode, one in Reject mode.
//! - Stateless: the engine holds its configuration and capabilities only.
//!   `enforce` takes `&self`, borrows its inputs for the call, and retains
//!   nothing.
//! - No reason codes: a caller cannot tell why the neutral change was
//!   returned. [`Status`] only says *what* was returned.

use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;
use crate::config::{Config, Mode};
use crate::strategy;

// ─── Status side channel ─────────────────────────────────────────────

/// Informational classification of an enforcement result.
///
/// Never required for correctness: the returned change alone is the
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The proposal was admissible and returned unchanged.
    PassThrough,
    /// The configured strategy produced an admissible substitute.
    Substituted,
    /// The neutral change was returned.
    Neutral,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PassThrough => "PASS_THROUGH",
            Self::Substituted => "SUBSTITUTED",
            Self::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// An effective change together with its [`Status`].
#[derive(Debug, Clone, PartialEq)]
pub struct Enforced<D> {
    /// The effective change. Apply exactly this.
    pub step: D,
    /// What kind of result `step` is.
    pub status: Status,
}

impl<D> Enforced<D> {
    /// Discard the status.
    pub fn into_step(self) -> D {
        self.step
    }

    /// Whether the neutral change was returned.
    pub fn is_neutral(&self) -> bool {
        self.status == Status::Neutral
    }
}

// ─── Engine ──────────────────────────────────────────────────────────

/// The step-admissibility gate.
///
/// Holds an immutable [`Config`] and a capability set. Safe to share across
/// threads whenever the capability set is `Sync`.
#[derive(Debug, Clone)]
pub struct Engine<C> {
    config: Config,
    capabilities: C,
}

impl<C: Capabilities> Engine<C> {
    /// Build an engine. The configuration is fixed from here on.
    pub fn new(config: Config, capabilities: C) -> Self {
        Self {
            config,
            capabilities,
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The enforcement mode.
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// The injected capability set.
    pub fn capabilities(&self) -> &C {
        &self.capabilities
    }

    /// Turn a proposed change into an effective change.
    ///
    /// Returns `proposed` unchanged when it is admissible at `state`;
    /// otherwise an admissible substitute from the configured strategy, or
    /// the neutral change.
    pub fn enforce(&self, state: &C::State, proposed: &C::Step) -> C::Step {
        self.enforce_with_status(state, proposed).into_step()
    }

    /// [`enforce`](Self::enforce) plus an informational [`Status`].
    pub fn enforce_with_status(&self, state: &C::State, proposed: &C::Step) -> Enforced<C::Step> {
        let caps = &self.capabilities;

        if !caps.is_wired() {
            return self.neutral();
        }

        if strategy::admits(caps, state, proposed) {
            return Enforced {
                step: proposed.clone(),
                status: Status::PassThrough,
            };
        }

        let substitute = match self.config.mode {
            Mode::Reject => strategy::reject::<C>(),
            Mode::Scale => strategy::scale(caps, &self.config, state, proposed),
            Mode::Project => strategy::project(caps, state, proposed),
        };

        match substitute {
            Some(step) => Enforced {
                step,
                status: Status::Substituted,
            },
            None => self.neutral(),
        }
    }

    fn neutral(&self) -> Enforced<C::Step> {
        Enforced {
            step: self.capabilities.neutral_step(),
            status: Status::Neutral,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
