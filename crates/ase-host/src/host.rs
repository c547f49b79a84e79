//! # Host Loop
//!
//! The integration side of the gate. The loop owns the current state and one
//! engine, and follows the contract exactly:
//!
//! ```text
//! for each proposal:
//!     effective = engine.enforce(state, proposal)     // once
//!     state     = apply(state, effective)             // exactly that
//! ```
//!
//! The original proposal is never applied, and the effective change is never
//! post-processed. When the host cannot obtain an effective change at all it
//! calls [`HostLoop::neutral_step`] instead.
//!
//! [`HostLoop::run_ungated`] is the deliberate exception: it applies raw
//! proposals so gated and ungated runs can be compared from the same seed.

use ase_core::{Engine, Enforced, Finite, Status};
use ase_envelope::Transition;

use crate::proposer::Proposer;
use crate::stats::RunStats;

/// A host loop over one domain.
pub struct HostLoop<C: Transition> {
    engine: Engine<C>,
    state: C::State,
    stats: RunStats,
}

impl<C: Transition> HostLoop<C> {
    /// Start a loop at `initial`.
    pub fn new(engine: Engine<C>, initial: C::State) -> Self {
        Self {
            engine,
            state: initial,
            stats: RunStats::default(),
        }
    }

    /// The current state.
    pub fn state(&self) -> &C::State {
        &self.state
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// The gate this loop enforces through.
    pub fn engine(&self) -> &Engine<C> {
        &self.engine
    }

    /// Consume the loop and return the final state.
    pub fn into_state(self) -> C::State {
        self.state
    }

    /// Enforce one proposal and apply exactly the effective change.
    pub fn step(&mut self, proposed: &C::Step) -> Status {
        let non_finite = !proposed.is_finite();
        let Enforced { step, status } = self.engine.enforce_with_status(&self.state, proposed);
        self.commit(&step);
        self.stats.record(status, non_finite);

        if status != Status::PassThrough {
            tracing::debug!(
                step = self.stats.steps,
                %status,
                non_finite,
                "proposal not applied as proposed"
            );
        }
        status
    }

    /// Apply the neutral change without consulting the gate.
    ///
    /// For hosts that failed to obtain an effective change; counted as a
    /// neutral emission.
    pub fn neutral_step(&mut self) {
        let neutral = self.engine.capabilities().neutral_step();
        self.commit(&neutral);
        self.stats.record(Status::Neutral, false);
        tracing::debug!(step = self.stats.steps, "host fell back to the neutral change");
    }

    /// Drive `steps` proposals through the gate.
    pub fn run<P>(&mut self, proposer: &mut P, steps: u64) -> RunStats
    where
        P: Proposer<C::State, Step = C::Step> + ?Sized,
    {
        for _ in 0..steps {
            let proposed = proposer.propose(&self.state);
            self.step(&proposed);
        }

        tracing::info!(
            mode = %self.engine.mode(),
            steps = self.stats.steps,
            pass_throughs = self.stats.pass_throughs,
            substitutions = self.stats.substitutions,
            neutral = self.stats.neutral_emissions,
            non_finite = self.stats.non_finite_proposals,
            exits = self.stats.envelope_exits,
            "gated run complete"
        );
        self.stats
    }

    /// Apply `steps` raw proposals, bypassing the gate.
    ///
    /// Admissibility is still evaluated (a fault counts as inadmissible) so
    /// the counters are comparable with a gated run.
    pub fn run_ungated<P>(&mut self, proposer: &mut P, steps: u64) -> RunStats
    where
        P: Proposer<C::State, Step = C::Step> + ?Sized,
    {
        for _ in 0..steps {
            let proposed = proposer.propose(&self.state);
            let non_finite = !proposed.is_finite();
            let admissible = !non_finite
                && self
                    .engine
                    .capabilities()
                    .is_admissible(&self.state, &proposed)
                    .unwrap_or(false);

            self.stats.steps += 1;
            if non_finite {
                self.stats.non_finite_proposals += 1;
            }
            if admissible {
                self.stats.pass_throughs += 1;
            } else {
                self.stats.inadmissible_proposals += 1;
            }
            self.commit(&proposed);
        }

        tracing::info!(
            steps = self.stats.steps,
            inadmissible = self.stats.inadmissible_proposals,
            non_finite = self.stats.non_finite_proposals,
            exits = self.stats.envelope_exits,
            "ungated run complete"
        );
        self.stats
    }

    fn commit(&mut self, step: &C::Step) {
        let domain = self.engine.capabilities();
        self.state = domain.apply(&self.state, step);
        if !domain.is_inside(&self.state) {
            self.stats.envelope_exits += 1;
        }
    }
}
