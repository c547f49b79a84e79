//! # Envelope Errors
//!
//! Raised when an envelope is constructed with parameters that cannot
//! describe a non-empty admissible domain, or when a host hands an envelope a
//! state of the wrong shape.

use thiserror::Error;

/// Invalid envelope parameters or state shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    /// A bound or coefficient is NaN, infinite, or out of its range.
    #[error("invalid envelope parameter {name}: {value} ({expected})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Human-readable constraint.
        expected: &'static str,
    },

    /// Vector envelopes need at least one component.
    #[error("envelope dimension must be positive")]
    ZeroDimension,

    /// The sign-preserved prefix is longer than the vector.
    #[error("sign-preserved prefix {prefix} exceeds dimension {dim}")]
    SignPrefixTooLong {
        /// Requested prefix length.
        prefix: usize,
        /// Envelope dimension.
        dim: usize,
    },

    /// A state vector does not match the envelope dimension.
    #[error("state has {actual} components, envelope expects {expected}")]
    DimensionMismatch {
        /// Envelope dimension.
        expected: usize,
        /// Dimension of the supplied vector.
        actual: usize,
    },
}

/// Require `value` finite and strictly positive.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, EnvelopeError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EnvelopeError::InvalidParameter {
            name,
            value,
            expected: "finite and > 0",
        })
    }
}

/// Require `value` finite and non-negative.
pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, EnvelopeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EnvelopeError::InvalidParameter {
            name,
            value,
            expected: "finite and >= 0",
        })
    }
}

/// Require a decay coefficient in `[0, 1)`.
pub(crate) fn decay(name: &'static str, value: f64) -> Result<f64, EnvelopeError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EnvelopeError::InvalidParameter {
            name,
            value,
            expected: "in [0, 1)",
        })
    }
}
