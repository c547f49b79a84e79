//! # ase-cli — Command-Line Interface for the ASE Gate
//!
//! Provides the `ase` binary.
//!
//! ## Subcommands
//!
//! - `ase enforce` — Gate one scalar proposal and print the effective change.
//! - `ase run` — Drive a seeded host loop over a scalar, norm-ball or
//!   learning-state domain, optionally comparing ungated and gated runs.
//!
//! ```bash
//! ase enforce --state 0.9 --step 0.5 --mode scale
//! ase run --domain learning --mode project --steps 2000
//! ase run --scenario scenarios/ball.yaml --compare --json
//! ```

pub mod enforce;
pub mod run;
pub mod scenario;
