//! Per-case results and their dataset records.

use fixcmp_core::Real;
use serde::{Deserialize, Serialize};

use crate::family::CaseInput;

/// One candidate's result for one case.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub candidate: String,
    /// Decoded candidate output.
    pub output: Real,
    /// Non-negative error against the reference.
    pub error: Real,
    /// Net execution cost; may be negative.
    pub cost: i64,
}

/// A completed single-candidate case.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub case_index: usize,
    pub input: CaseInput,
    pub expected: Real,
    pub measurement: Measurement,
}

impl Sample {
    #[must_use]
    pub fn to_record(&self) -> DatasetRecord {
        DatasetRecord {
            input: RecordInput::from(&self.input),
            output: self.measurement.output.to_string(),
            error: self.measurement.error.to_string(),
        }
    }
}

/// How much the candidate improved on the baseline's error (`old / new`).
#[derive(Debug, Clone, PartialEq)]
pub enum Improvement {
    Ratio(Real),
    /// The candidate was exact while the baseline was not.
    Unbounded,
}

/// A completed head-to-head case: both candidates against one reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSample {
    pub case_index: usize,
    pub input: CaseInput,
    pub expected: Real,
    pub baseline: Measurement,
    pub candidate: Measurement,
}

impl PairSample {
    /// `cost(new) - cost(old)`; negative means the candidate is cheaper.
    #[must_use]
    pub fn cost_delta(&self) -> i64 {
        self.candidate.cost - self.baseline.cost
    }

    /// `error(new) - error(old)`; negative means the candidate is closer.
    #[must_use]
    pub fn error_delta(&self) -> Real {
        self.candidate.error.clone() - self.baseline.error.clone()
    }

    #[must_use]
    pub fn improvement(&self) -> Improvement {
        let (old, new) = (&self.baseline.error, &self.candidate.error);
        if *new == Real::ZERO {
            if *old == Real::ZERO {
                Improvement::Ratio(Real::ONE)
            } else {
                Improvement::Unbounded
            }
        } else {
            Improvement::Ratio(old.clone() / new.clone())
        }
    }

    #[must_use]
    pub fn to_record(&self) -> PairRecord {
        PairRecord {
            input: RecordInput::from(&self.input),
            expected: self.expected.to_string(),
            baseline_output: self.baseline.output.to_string(),
            baseline_error: self.baseline.error.to_string(),
            output: self.candidate.output.to_string(),
            error: self.candidate.error.to_string(),
            cost_delta: self.cost_delta(),
        }
    }
}

/// A case whose candidate invocation failed. Excluded from statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedCase {
    pub case_index: usize,
    pub input: CaseInput,
    pub candidate: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome<S> {
    Passed(S),
    Failed(FailedCase),
}

/// Reward-split arguments as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardInput {
    pub total_rewards: String,
    pub owner_fees: String,
    pub total_fees: String,
    pub owner_stake: String,
    pub total_stake: String,
}

/// Case input as written to a dataset: a decimal string for scalar
/// families, an object of decimal strings for the reward split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordInput {
    Scalar(String),
    Reward(RewardInput),
}

impl From<&CaseInput> for RecordInput {
    fn from(input: &CaseInput) -> Self {
        match input {
            CaseInput::Scalar(x) => Self::Scalar(x.to_string()),
            CaseInput::Reward(params) => Self::Reward(RewardInput {
                total_rewards: params.total_rewards().to_string(),
                owner_fees: params.owner_fees().to_string(),
                total_fees: params.total_fees().to_string(),
                owner_stake: params.owner_stake().to_string(),
                total_stake: params.total_stake().to_string(),
            }),
        }
    }
}

/// Dataset row for a single-candidate family. Field order is the file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub input: RecordInput,
    pub output: String,
    pub error: String,
}

/// Dataset row for a head-to-head family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub input: RecordInput,
    pub expected: String,
    pub baseline_output: String,
    pub baseline_error: String,
    pub output: String,
    pub error: String,
    pub cost_delta: i64,
}
