//! # ase-envelope — Admissible Domains
//!
//! Concrete capability sets for `ase-core`. Each envelope implements
//! [`ase_core::Capabilities`] (the admissibility predicate, neutral change,
//! scaling and projection) together with [`Transition`], the state update the
//! host applies to the effective change.
//!
//! ## Domains
//!
//! - **Bounded scalar** (`interval.rs`): `f64` state in `[-limit, limit]`.
//!
//! - **Norm ball** (`ball.rs`): `Vec<f64>` parameters inside an L2 ball with
//!   a sign-preserved prefix.
//!
//! - **Learning state** (`learning.rs`): parameters, their EMA, optional
//!   Adam moments and a step counter, bounded jointly; the proposed change
//!   is `Δθ` only.
//!
//! ## Crate Policy
//!
//! - Depends only on `ase-core` among internal crates.
//! - Capabilities never panic on non-finite input; they report a
//!   [`ase_core::CapabilityFault`].
//! - Parameter validation happens once, at construction.

pub mod ball;
pub mod error;
pub mod interval;
pub mod learning;
pub mod transition;
pub mod vector;

pub use ball::{NormBall, NormBallParams, DEFAULT_TOLERANCE};
pub use error::EnvelopeError;
pub use interval::BoundedScalar;
pub use learning::{AdamParams, LearningEnvelope, LearningParams, LearningState};
pub use transition::Transition;
