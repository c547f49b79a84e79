//! # ase-core — Admissible Step Enforcement
//!
//! A step-admissibility gate. Given the current state of a system and a
//! *proposed* change, [`Engine::enforce`] returns an *effective* change that
//! keeps the state inside a caller-defined admissible domain, or the
//! domain's neutral (no-op) change.
//!
//! The gate answers one question per call. It does not own state, drive a
//! loop, generate steps, optimize, remember history or log.
//!
//! ## Modules
//!
//! - **Engine** (`engine.rs`): admissibility check, mode dispatch, neutral
//!   fallback, and the informational [`Status`] side channel.
//!
//! - **Strategies** (`strategy.rs`): Reject, bounded geometric Scale, and
//!   single-shot Project.
//!
//! - **Capabilities** (`capability.rs`): the [`Capabilities`] trait through
//!   which the caller injects the admissibility predicate, neutral-change
//!   provider, scaling and projection functions; plus [`Dependencies`], a
//!   function-pointer capability set.
//!
//! - **Configuration** (`config.rs`): [`Mode`], validated [`ScaleFactor`],
//!   and [`Config`].
//!
//! - **Finite** (`finite.rs`): numerical fault detection on change values.
//!
//! ## Integration Contract
//!
//! ```text
//! S_next = apply(S, engine.enforce(&S, &proposed))
//! ```
//!
//! Call `enforce` exactly once per proposed change, apply exactly the
//! returned value, and never apply the original proposal directly. If the
//! host cannot obtain an effective change, it must behave as though the
//! neutral change was returned.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ase-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code, no I/O, no logging, no global state.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod finite;
mod strategy;

// Re-export primary types for ergonomic imports.
pub use capability::{AdmissibleFn, Capabilities, Dependencies, NeutralFn, ProjectFn, ScaleFn};
pub use config::{
    Config, Mode, ParseModeError, ScaleFactor, DEFAULT_MAX_SCALE_ATTEMPTS, DEFAULT_SCALE_FACTOR,
};
pub use engine::{Engine, Enforced, Status};
pub use error::{CapabilityFault, ConfigError};
pub use finite::Finite;
