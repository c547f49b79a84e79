//! # Run Statistics
//!
//! Counters accumulated by a [`HostLoop`](crate::HostLoop). Purely
//! observational; nothing in the loop branches on them.

use serde::{Deserialize, Serialize};

use ase_core::Status;

/// Per-run enforcement counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Proposals processed.
    pub steps: u64,
    /// Proposals containing a non-finite component.
    pub non_finite_proposals: u64,
    /// Proposals that were not admissible as proposed.
    pub inadmissible_proposals: u64,
    /// Proposals applied unchanged.
    pub pass_throughs: u64,
    /// Proposals replaced by an admissible substitute.
    pub substitutions: u64,
    /// Neutral changes applied.
    pub neutral_emissions: u64,
    /// Steps after which the state was outside the admissible domain.
    pub envelope_exits: u64,
}

impl RunStats {
    /// Record one gated step.
    pub fn record(&mut self, status: Status, non_finite: bool) {
        self.steps += 1;
        if non_finite {
            self.non_finite_proposals += 1;
        }
        match status {
            Status::PassThrough => self.pass_throughs += 1,
            Status::Substituted => {
                self.inadmissible_proposals += 1;
                self.substitutions += 1;
            }
            Status::Neutral => {
                self.inadmissible_proposals += 1;
                self.neutral_emissions += 1;
            }
        }
    }

    /// Fraction of proposals applied unchanged. Zero before the first step.
    pub fn pass_through_rate(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.pass_throughs as f64 / self.steps as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_status() {
        let mut s = RunStats::default();
        s.record(Status::PassThrough, false);
        s.record(Status::Substituted, false);
        s.record(Status::Neutral, true);
        s.record(Status::Neutral, false);

        assert_eq!(s.steps, 4);
        assert_eq!(s.pass_throughs, 1);
        assert_eq!(s.substitutions, 1);
        assert_eq!(s.neutral_emissions, 2);
        assert_eq!(s.inadmissible_proposals, 3);
        assert_eq!(s.non_finite_proposals, 1);
        assert_eq!(s.pass_through_rate(), 0.25);
    }

    #[test]
    fn test_empty_rate() {
        assert_eq!(RunStats::default().pass_through_rate(), 0.0);
    }

    #[test]
    fn test_serializes_snake_case_fields() {
        let json = serde_json::to_value(RunStats::default()).unwrap();
        assert_eq!(json["neutral_emissions"], 0);
        assert_eq!(json["envelope_exits"], 0);
    }
}
