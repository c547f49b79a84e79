//! # `ase run` — seeded host-loop runs
//!
//! Loads a scenario (or starts from defaults), applies command-line
//! overrides, and drives a [`HostLoop`] through the gate. With `--compare`
//! the same seed is replayed ungated and under every mode.
//!
//! ```bash
//! ase run --domain ball --mode project --steps 2000
//! ase run --scenario scenarios/learning.yaml --compare
//! ase run --domain learning --compare --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use ase_core::{Config, Engine, Mode};
use ase_envelope::{BoundedScalar, LearningEnvelope, LearningState, NormBall, Transition};
use ase_host::{initial_theta, HostLoop, NoisyDescent, Proposer, RunStats, ScalarWalk};

use crate::scenario::{DomainKind, DomainSpec, Scenario};

/// Arguments for `ase run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file (YAML or JSON).
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Domain to run; replaces the scenario's domain when the kind differs.
    #[arg(long, value_enum)]
    pub domain: Option<DomainKind>,

    /// Enforcement mode override.
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Number of proposals.
    #[arg(long)]
    pub steps: Option<u64>,

    /// Proposer seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Descent rate for vector domains.
    #[arg(long)]
    pub eta: Option<f64>,

    /// Also run ungated and under every mode, and print a comparison.
    #[arg(long)]
    pub compare: bool,

    /// Emit results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// `ungated` or the mode name.
    pub label: String,
    /// Whether the final state is inside the domain.
    pub final_inside: bool,
    /// Counters.
    pub stats: RunStats,
}

/// Resolve the scenario from a file and overrides.
pub fn resolve_scenario(args: &RunArgs) -> Result<Scenario> {
    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::default(),
    };

    if let Some(kind) = args.domain {
        if scenario.domain.kind() != kind {
            scenario.domain = DomainSpec::defaults(kind);
        }
    }
    if let Some(mode) = args.mode {
        scenario.engine.mode = mode;
    }
    if let Some(steps) = args.steps {
        scenario.steps = steps;
    }
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if let Some(eta) = args.eta {
        scenario.eta = eta;
    }
    scenario.validate()?;
    Ok(scenario)
}

/// Run a scenario once, gated (`Some(config)`) or ungated (`None`).
pub fn run_scenario(scenario: &Scenario, gate: Option<Config>) -> Result<RunReport> {
    let label = gate.map_or_else(|| "ungated".to_string(), |c| c.mode.as_str().to_string());
    let config = gate.unwrap_or(scenario.engine);
    let steps = scenario.steps;

    let (final_inside, stats) = match &scenario.domain {
        DomainSpec::Scalar { limit, amplitude } => {
            let domain = BoundedScalar::new(*limit)?;
            let proposer = ScalarWalk::new(scenario.seed, *amplitude);
            drive(domain, 0.0, config, proposer, steps, gate.is_some())
        }
        DomainSpec::Ball(params) => {
            let domain = NormBall::new(*params)?;
            let theta = domain.clamp_into(initial_theta(params.dim, params.sign_preserve))?;
            let proposer = NoisyDescent::new(scenario.seed, scenario.eta);
            drive(domain, theta, config, proposer, steps, gate.is_some())
        }
        DomainSpec::Learning(params) => {
            let domain = LearningEnvelope::new(*params)?;
            let state = domain.clamp_into(LearningState::new(initial_theta(
                params.dim,
                params.sign_preserve,
            )))?;
            let proposer = NoisyDescent::new(scenario.seed, scenario.eta);
            drive(domain, state, config, proposer, steps, gate.is_some())
        }
    };

    Ok(RunReport {
        label,
        final_inside,
        stats,
    })
}

fn drive<C, P>(
    domain: C,
    initial: C::State,
    config: Config,
    mut proposer: P,
    steps: u64,
    gated: bool,
) -> (bool, RunStats)
where
    C: Transition,
    P: Proposer<C::State, Step = C::Step>,
{
    let mut host = HostLoop::new(Engine::new(config, domain), initial);
    let stats = if gated {
        host.run(&mut proposer, steps)
    } else {
        host.run_ungated(&mut proposer, steps)
    };
    let inside = host.engine().capabilities().is_inside(host.state());
    (inside, stats)
}

/// The ungated baseline followed by one gated run per mode.
pub fn compare_scenario(scenario: &Scenario) -> Result<Vec<RunReport>> {
    let mut reports = vec![run_scenario(scenario, None)?];
    for mode in Mode::ALL {
        let config = Config {
            mode,
            ..scenario.engine
        };
        reports.push(run_scenario(scenario, Some(config))?);
    }
    Ok(reports)
}

/// Execute `ase run`.
pub fn run_run(args: &RunArgs) -> Result<u8> {
    let scenario = resolve_scenario(args)?;
    tracing::info!(
        domain = ?scenario.domain.kind(),
        mode = %scenario.engine.mode,
        steps = scenario.steps,
        seed = scenario.seed,
        "starting run"
    );

    let reports = if args.compare {
        compare_scenario(&scenario)?
    } else {
        vec![run_scenario(&scenario, Some(scenario.engine))?]
    };

    if args.json {
        if args.compare {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else if let Some(report) = reports.first() {
            println!("{}", serde_json::to_string_pretty(&report.stats)?);
        }
    } else {
        print_table(&reports);
    }
    Ok(0)
}

fn print_table(reports: &[RunReport]) {
    println!(
        "  {:<9} {:>7} {:>7} {:>7} {:>7} {:>10} {:>7} {:>7}",
        "run", "steps", "pass", "subst", "neutral", "non-finite", "exits", "inside"
    );
    for r in reports {
        let s = &r.stats;
        println!(
            "  {:<9} {:>7} {:>7} {:>7} {:>7} {:>10} {:>7} {:>7}",
            r.label,
            s.steps,
            s.pass_throughs,
            s.substitutions,
            s.neutral_emissions,
            s.non_finite_proposals,
            s.envelope_exits,
            if r.final_inside { "yes" } else { "no" }
        );
    }
}
