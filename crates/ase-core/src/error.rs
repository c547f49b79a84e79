//! # Error Types
//!
//! Errors exist only at construction time. Once an [`Engine`](crate::Engine)
//! is built, `enforce` has no error channel: every fault collapses into the
//! neutral change.
//!
//! ## Design
//!
//! - Configuration errors fail loudly with the offending value.
//! - Capability faults are internal signals from injected capabilities to the
//!   engine. They never cross the `enforce` boundary and carry no reason code
//!   outward.

use thiserror::Error;

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Scale factor must lie strictly between 0 and 1.
    #[error("scale factor must be in the open interval (0, 1), got {0}")]
    ScaleFactorOutOfRange(f64),

    /// Scale factor was NaN or infinite.
    #[error("scale factor must be finite")]
    NonFiniteScaleFactor,
}

/// A fault raised by an injected capability.
///
/// The engine maps every variant to the same outcome: an admissibility
/// fault means "not admissible", a transform fault means "strategy failed".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityFault {
    /// The capability is not provided by this capability set.
    #[error("capability not provided")]
    Unavailable,

    /// The capability produced or received a non-finite value.
    #[error("non-finite value")]
    NonFinite,

    /// The capability could not produce a result.
    #[error("capability failed: {0}")]
    Rejected(&'static str),
}
