//! # Engine Configuration
//!
//! Immutable, caller-constructed configuration: the enforcement mode and the
//! bounds of the Scale strategy. An [`Engine`](crate::Engine) copies its
//! configuration at construction and never changes it afterwards.
//!
//! ## Validation
//!
//! [`ScaleFactor`] is a validated newtype. It cannot hold a value outside the
//! open interval (0, 1), and deserialization of an out-of-range value fails,
//! so a loaded [`Config`] is valid by construction.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bound on Scale attempts.
pub const DEFAULT_MAX_SCALE_ATTEMPTS: u32 = 16;

/// Default per-attempt shrink multiplier.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.5;

// ─── Mode ────────────────────────────────────────────────────────────

/// How an inadmissible proposal is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Discard the proposal and return the neutral change.
    #[default]
    Reject,
    /// Shrink the proposal by a geometric factor until admissible.
    Scale,
    /// Project the proposal once onto the admissible domain.
    Project,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Mode; 3] = [Mode::Reject, Mode::Scale, Mode::Project];

    /// Lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Scale => "scale",
            Self::Project => "project",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Reject => "REJECT",
            Self::Scale => "SCALE",
            Self::Project => "PROJECT",
        };
        f.write_str(s)
    }
}

/// Error parsing a [`Mode`] from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown enforcement mode: {0:?} (expected reject, scale or project)")]
pub struct ParseModeError(String);

impl std::str::FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

// ─── Scale Factor ────────────────────────────────────────────────────

/// Per-attempt shrink multiplier for the Scale strategy, in (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Validate a shrink multiplier.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NonFiniteScaleFactor);
        }
        if value <= 0.0 || value >= 1.0 {
            return Err(ConfigError::ScaleFactorOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The raw multiplier.
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(DEFAULT_SCALE_FACTOR)
    }
}

impl TryFrom<f64> for ScaleFactor {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScaleFactor> for f64 {
    fn from(factor: ScaleFactor) -> Self {
        factor.0
    }
}

impl std::fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Config ──────────────────────────────────────────────────────────

/// Engine configuration, fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Enforcement mode.
    #[serde(default)]
    pub mode: Mode,
    /// Upper bound on Scale attempts. Zero makes Scale return neutral.
    #[serde(default = "default_max_scale_attempts")]
    pub max_scale_attempts: u32,
    /// Per-attempt shrink multiplier.
    #[serde(default)]
    pub scale_factor: ScaleFactor,
}

fn default_max_scale_attempts() -> u32 {
    DEFAULT_MAX_SCALE_ATTEMPTS
}

impl Config {
    /// Reject mode with default Scale bounds.
    pub fn reject() -> Self {
        Self::with_mode(Mode::Reject)
    }

    /// Project mode with default Scale bounds.
    pub fn project() -> Self {
        Self::with_mode(Mode::Project)
    }

    /// Scale mode with explicit bounds.
    pub fn scale(max_scale_attempts: u32, scale_factor: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            mode: Mode::Scale,
            max_scale_attempts,
            scale_factor: ScaleFactor::new(scale_factor)?,
        })
    }

    /// Default bounds with the given mode.
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Reject,
            max_scale_attempts: DEFAULT_MAX_SCALE_ATTEMPTS,
            scale_factor: ScaleFactor::default(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
