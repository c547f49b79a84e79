//! # Scalar Domain — Host Integration Tests
//!
//! One-dimensional state, admissible iff `|S + ΔS| ≤ 1`. Covers:
//! - The concrete enforcement scenarios through a host loop
//! - Admissibility evaluations per call stay within the mode's bound
//! - The function-pointer capability set behaves like the domain type
//! - Seeded runs are repeatable

use std::cell::Cell;

use ase_core::{Capabilities, CapabilityFault, Config, Dependencies, Engine, Mode, Status};
use ase_envelope::{BoundedScalar, Transition};
use ase_host::{HostLoop, Proposer, ScalarWalk};
use proptest::prelude::*;

/// `BoundedScalar` that counts admissibility evaluations.
#[derive(Default)]
struct Counted {
    inner: BoundedScalar,
    evaluations: Cell<u32>,
}

impl Counted {
    fn take(&self) -> u32 {
        self.evaluations.replace(0)
    }
}

impl Capabilities for Counted {
    type State = f64;
    type Step = f64;

    fn is_admissible(&self, state: &f64, step: &f64) -> Result<bool, CapabilityFault> {
        self.evaluations.set(self.evaluations.get() + 1);
        self.inner.is_admissible(state, step)
    }

    fn neutral_step(&self) -> f64 {
        self.inner.neutral_step()
    }

    fn scale_step(&self, step: &f64, k: f64) -> Result<f64, CapabilityFault> {
        self.inner.scale_step(step, k)
    }

    fn project_step(&self, state: &f64, step: &f64) -> Result<f64, CapabilityFault> {
        self.inner.project_step(state, step)
    }
}

impl Transition for Counted {
    fn apply(&self, state: &f64, step: &f64) -> f64 {
        self.inner.apply(state, step)
    }

    fn is_inside(&self, state: &f64) -> bool {
        self.inner.is_inside(state)
    }
}

// ---------------------------------------------------------------------------
// 1. Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn admissible_proposal_passes_through() {
    let mut host = HostLoop::new(Engine::new(Config::reject(), BoundedScalar::unit()), 0.0);
    assert_eq!(host.step(&0.2), Status::PassThrough);
    assert_eq!(*host.state(), 0.2);
}

#[test]
fn reject_holds_state() {
    let mut host = HostLoop::new(Engine::new(Config::reject(), BoundedScalar::unit()), 0.9);
    assert_eq!(host.step(&0.5), Status::Neutral);
    assert_eq!(*host.state(), 0.9);
}

#[test]
fn scale_lands_on_fourth_attempt() {
    let config = Config::scale(4, 0.5).unwrap();
    let mut host = HostLoop::new(Engine::new(config, BoundedScalar::unit()), 0.9);
    assert_eq!(host.step(&0.5), Status::Substituted);
    assert_eq!(*host.state(), 0.9 + 0.0625);
}

#[test]
fn project_clamps_to_boundary() {
    let mut host = HostLoop::new(Engine::new(Config::project(), BoundedScalar::unit()), 0.9);
    assert_eq!(host.step(&0.5), Status::Substituted);
    assert!((host.state() - 1.0).abs() < 1e-12);
}

#[test]
fn nan_proposal_is_neutral_in_every_mode() {
    for mode in Mode::ALL {
        let mut host = HostLoop::new(
            Engine::new(Config::with_mode(mode), BoundedScalar::unit()),
            0.0,
        );
        assert_eq!(host.step(&f64::NAN), Status::Neutral, "mode {mode}");
        assert_eq!(*host.state(), 0.0);
    }
}

// ---------------------------------------------------------------------------
// 2. Evaluation-count bound
// ---------------------------------------------------------------------------

#[test]
fn evaluations_per_call_are_bounded() {
    let attempts = 6;
    let bounds = [
        (Config::reject(), 1),
        (Config::scale(attempts, 0.5).unwrap(), 1 + attempts),
        (Config::project(), 2),
    ];

    for (config, bound) in bounds {
        let domain = Counted::default();
        let mut host = HostLoop::new(Engine::new(config, &domain), 0.0);
        let mut walk = ScalarWalk::new(12345, 0.8);

        for _ in 0..2000 {
            let proposed = walk.propose(host.state());
            host.step(&proposed);
            let used = domain.take();
            assert!(
                used <= bound,
                "{} mode used {used} evaluations (bound {bound})",
                config.mode
            );
            if !proposed.is_finite() {
                assert_eq!(used, 0, "non-finite proposals never reach the predicate");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Function-pointer capabilities
// ---------------------------------------------------------------------------

fn unit_admissible(s: &f64, d: &f64) -> bool {
    (s + d).abs() <= 1.0
}

fn unit_scale(d: &f64, k: f64) -> Option<f64> {
    Some(d * k)
}

fn unit_project(s: &f64, d: &f64) -> Option<f64> {
    Some((s + d).clamp(-1.0, 1.0) - s)
}

#[test]
fn dependencies_match_domain_type() {
    let deps = Dependencies::new(unit_admissible, || 0.0)
        .with_scale(unit_scale)
        .with_project(unit_project);

    for mode in Mode::ALL {
        let by_fn = Engine::new(Config::with_mode(mode), deps);
        let by_type = Engine::new(Config::with_mode(mode), BoundedScalar::unit());
        for (s, d) in [(0.0, 0.2), (0.9, 0.5), (-0.9, -0.5), (0.0, f64::NAN)] {
            let a = by_fn.enforce(&s, &d);
            let b = by_type.enforce(&s, &d);
            assert_eq!(a.to_bits(), b.to_bits(), "mode {mode}, S={s}, ΔS={d}");
        }
    }
}

#[test]
fn unwired_dependencies_are_always_neutral() {
    let deps: Dependencies<f64, f64> = Dependencies::default();
    let engine = Engine::new(Config::reject(), deps);
    assert_eq!(engine.enforce(&0.0, &0.2), 0.0);
}

// ---------------------------------------------------------------------------
// 4. Repeatability
// ---------------------------------------------------------------------------

fn final_state(mode: Mode, seed: u64) -> (f64, ase_host::RunStats) {
    let mut host = HostLoop::new(
        Engine::new(Config::with_mode(mode), BoundedScalar::unit()),
        0.0,
    );
    let stats = host.run(&mut ScalarWalk::new(seed, 0.5), 2000);
    (host.into_state(), stats)
}

#[test]
fn seeded_runs_are_bit_identical() {
    for mode in Mode::ALL {
        let (a, sa) = final_state(mode, 12345);
        let (b, sb) = final_state(mode, 12345);
        assert_eq!(a.to_bits(), b.to_bits(), "mode {mode}");
        assert_eq!(sa, sb);
    }
}

proptest! {
    #[test]
    fn gated_scalar_runs_stay_inside(seed in any::<u64>(), mode_idx in 0usize..3, start in -1.0f64..=1.0) {
        let mode = Mode::ALL[mode_idx];
        let mut host = HostLoop::new(
            Engine::new(Config::with_mode(mode), BoundedScalar::unit()),
            start,
        );
        let stats = host.run(&mut ScalarWalk::new(seed, 0.7), 200);
        prop_assert_eq!(stats.envelope_exits, 0);
        prop_assert!(host.state().abs() <= 1.0);
        prop_assert_eq!(
            stats.pass_throughs + stats.substitutions + stats.neutral_emissions,
            stats.steps
        );
    }
}
