//! # ase-host — Host Integration
//!
//! Everything on the host side of the gate: where proposals come from, how
//! the effective change is applied, and what a run looked like afterwards.
//!
//! ## Modules
//!
//! - **Host loop** (`host.rs`): [`HostLoop`] calls `enforce` exactly once per
//!   proposal and applies exactly the returned change; also the ungated
//!   baseline run used for comparison.
//!
//! - **Proposers** (`proposer.rs`): seeded, deliberately unreliable sources
//!   of proposed changes ([`NoisyDescent`], [`ScalarWalk`]).
//!
//! - **Statistics** (`stats.rs`): [`RunStats`] counters.
//!
//! ## Crate Policy
//!
//! - The engine never logs; this crate emits the `tracing` events for a run.
//! - Same seed, same configuration, same domain ⇒ bit-identical trajectory.

pub mod host;
pub mod proposer;
pub mod stats;

pub use host::HostLoop;
pub use proposer::{initial_theta, NoisyDescent, Proposer, ScalarWalk, DEFAULT_ETA};
pub use stats::RunStats;
