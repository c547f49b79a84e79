//! # `ase enforce` — one-shot scalar enforcement
//!
//! Gates a single proposed change on the bounded scalar domain and reports
//! what a host would apply.
//!
//! ```bash
//! ase enforce --state 0.9 --step 0.5 --mode scale --max-attempts 4
//! ase enforce --state 0 --step nan --mode project --json
//! ```

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use ase_core::{
    Config, Engine, Mode, ScaleFactor, Status, DEFAULT_MAX_SCALE_ATTEMPTS, DEFAULT_SCALE_FACTOR,
};
use ase_envelope::{BoundedScalar, Transition};

/// Arguments for `ase enforce`.
#[derive(Args, Debug)]
pub struct EnforceArgs {
    /// Current state.
    #[arg(long, allow_negative_numbers = true)]
    pub state: f64,

    /// Proposed change. Accepts `nan` and `inf`.
    #[arg(long, allow_negative_numbers = true)]
    pub step: f64,

    /// Enforcement mode (reject, scale, project).
    #[arg(long, default_value_t = Mode::Reject)]
    pub mode: Mode,

    /// Half-width of the admissible interval.
    #[arg(long, default_value_t = 1.0)]
    pub limit: f64,

    /// Scale mode attempt bound.
    #[arg(long, default_value_t = DEFAULT_MAX_SCALE_ATTEMPTS)]
    pub max_attempts: u32,

    /// Scale mode shrink factor, in (0, 1).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    pub factor: f64,

    /// Emit the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Result of one enforcement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnforceReport {
    /// Engine mode.
    pub mode: Mode,
    /// State before the change.
    pub state: f64,
    /// The proposal as given.
    pub proposed: f64,
    /// The change the host applies.
    pub effective: f64,
    /// How the effective change was obtained.
    pub status: Status,
    /// State after applying the effective change.
    pub next_state: f64,
}

/// Gate one scalar proposal.
pub fn enforce_scalar(args: &EnforceArgs) -> Result<EnforceReport> {
    let config = Config {
        mode: args.mode,
        max_scale_attempts: args.max_attempts,
        scale_factor: ScaleFactor::new(args.factor).context("invalid --factor")?,
    };
    let domain = BoundedScalar::new(args.limit).context("invalid --limit")?;
    let engine = Engine::new(config, domain);

    let enforced = engine.enforce_with_status(&args.state, &args.step);
    let next_state = domain.apply(&args.state, &enforced.step);

    Ok(EnforceReport {
        mode: args.mode,
        state: args.state,
        proposed: args.step,
        effective: enforced.step,
        status: enforced.status,
        next_state,
    })
}

/// Execute `ase enforce`.
pub fn run_enforce(args: &EnforceArgs) -> Result<u8> {
    let report = enforce_scalar(args)?;
    tracing::debug!(?report, "enforced");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("  mode:      {}", report.mode);
        println!("  state:     {}", report.state);
        println!("  proposed:  {}", report.proposed);
        println!("  effective: {}", report.effective);
        println!("  status:    {}", report.status);
        println!("  next:      {}", report.next_state);
    }
    Ok(0)
}
