//! # Scenario Files
//!
//! A scenario describes one host-loop run: the engine configuration, the
//! domain, and the seeded proposer settings. Files are YAML (`.yaml`,
//! `.yml`) or JSON (`.json`); every field has a default.
//!
//! ```yaml
//! engine:
//!   mode: project
//!   max_scale_attempts: 16
//!   scale_factor: 0.5
//! domain:
//!   learning:
//!     dim: 256
//!     theta_radius: 5.0
//!     ema_radius: 5.0
//!     gap_radius: 2.0
//!     sign_preserve: 8
//!     beta: 0.98
//! steps: 2000
//! seed: 12345
//! eta: 0.02
//! ```

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ase_core::Config;
use ase_envelope::{
    BoundedScalar, EnvelopeError, LearningEnvelope, LearningParams, NormBall, NormBallParams,
};
use ase_host::DEFAULT_ETA;

/// Default number of proposals per run.
pub const DEFAULT_STEPS: u64 = 2000;
/// Default proposer seed.
pub const DEFAULT_SEED: u64 = 12345;

/// Errors loading or validating a scenario.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("failed to read scenario {path}: {source}")]
    Io {
        /// Scenario path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The extension is neither YAML nor JSON.
    #[error("unsupported scenario format {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// YAML syntax or schema error.
    #[error("invalid YAML scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or schema error.
    #[error("invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),

    /// The domain parameters describe no admissible domain.
    #[error("invalid domain: {0}")]
    Domain(#[from] EnvelopeError),

    /// The descent rate is not a finite number.
    #[error("eta must be finite, got {0}")]
    NonFiniteEta(f64),
}

/// Domain kinds selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainKind {
    /// Bounded scalar interval.
    Scalar,
    /// L2 ball with a sign-preserved prefix.
    Ball,
    /// Parameters, EMA and step counter.
    Learning,
}

/// Domain section of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSpec {
    /// `[-limit, limit]`, driven by a uniform walk of half-width `amplitude`.
    Scalar {
        /// Interval half-width.
        #[serde(default = "default_limit")]
        limit: f64,
        /// Proposal half-width.
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
    /// Norm-ball envelope.
    Ball(NormBallParams),
    /// Learning-state envelope.
    Learning(LearningParams),
}

fn default_limit() -> f64 {
    1.0
}

fn default_amplitude() -> f64 {
    0.5
}

impl DomainSpec {
    /// Default parameters for a domain kind.
    pub fn defaults(kind: DomainKind) -> Self {
        match kind {
            DomainKind::Scalar => DomainSpec::Scalar {
                limit: default_limit(),
                amplitude: default_amplitude(),
            },
            DomainKind::Ball => DomainSpec::Ball(NormBallParams::default()),
            DomainKind::Learning => DomainSpec::Learning(LearningParams::default()),
        }
    }

    /// Which kind of domain this is.
    pub fn kind(&self) -> DomainKind {
        match self {
            DomainSpec::Scalar { .. } => DomainKind::Scalar,
            DomainSpec::Ball(_) => DomainKind::Ball,
            DomainSpec::Learning(_) => DomainKind::Learning,
        }
    }

    /// Construct the domain once to check its parameters.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        match self {
            DomainSpec::Scalar { limit, amplitude } => {
                BoundedScalar::new(*limit)?;
                // The walk samples from [-amplitude, amplitude].
                if (2.0 * amplitude).is_finite() {
                    Ok(())
                } else {
                    Err(EnvelopeError::InvalidParameter {
                        name: "amplitude",
                        value: *amplitude,
                        expected: "finite with a finite range [-amplitude, amplitude]",
                    })
                }
            }
            DomainSpec::Ball(p) => NormBall::new(*p).map(drop),
            DomainSpec::Learning(p) => LearningEnvelope::new(*p).map(drop),
        }
    }
}

impl Default for DomainSpec {
    fn default() -> Self {
        DomainSpec::defaults(DomainKind::Scalar)
    }
}

/// One host-loop run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Engine configuration.
    #[serde(default)]
    pub engine: Config,
    /// Domain and its parameters.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub domain: DomainSpec,
    /// Number of proposals.
    #[serde(default = "default_steps")]
    pub steps: u64,
    /// Proposer seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Descent rate for vector proposers.
    #[serde(default = "default_eta")]
    pub eta: f64,
}

fn default_steps() -> u64 {
    DEFAULT_STEPS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_eta() -> f64 {
    DEFAULT_ETA
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            engine: Config::default(),
            domain: DomainSpec::default(),
            steps: DEFAULT_STEPS,
            seed: DEFAULT_SEED,
            eta: DEFAULT_ETA,
        }
    }
}

impl Scenario {
    /// Load and validate a scenario, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let scenario = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            _ => return Err(ScenarioError::UnsupportedFormat(ext)),
        };
        tracing::debug!(
            path = %path.display(),
            domain = ?scenario.domain.kind(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    /// Parse and validate a YAML scenario.
    pub fn from_yaml_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse and validate a JSON scenario.
    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the domain parameters and the descent rate.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.eta.is_finite() {
            return Err(ScenarioError::NonFiniteEta(self.eta));
        }
        self.domain.validate()?;
        Ok(())
    }
}
