//! Case families: what is sampled, how it goes on the wire, and how error is
//! measured.

use dashu::integer::IBig;
use fixcmp_core::codec;
use fixcmp_core::real::abs;
use fixcmp_core::{CodecError, Parameters, Precision, Real};
use serde::{Deserialize, Serialize};

/// A batch of cases exercising one formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFamily {
    /// Weighted geometric mean reward split; integer arguments and result.
    RewardSplit,
    /// `exp(x)` for `x ∈ [-65, 0)`; fixed-point argument and result.
    Exp,
    /// `ln(x)` for `x ∈ (0, 1]`; fixed-point argument and result.
    Ln,
}

impl CaseFamily {
    pub const ALL: [Self; 3] = [Self::RewardSplit, Self::Exp, Self::Ln];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RewardSplit => "reward_split",
            Self::Exp => "exp",
            Self::Ln => "ln",
        }
    }

    /// Sample count used when `SAMPLES` is unset.
    #[must_use]
    pub const fn default_samples(self) -> usize {
        match self {
            Self::RewardSplit => 128,
            Self::Exp => 1024,
            Self::Ln => 128,
        }
    }

    /// Dataset artifact path, relative to the output directory.
    #[must_use]
    pub const fn dataset_path(self) -> &'static str {
        match self {
            Self::RewardSplit => "data/reward_split.json",
            Self::Exp => "data/exp.json",
            Self::Ln => "data/ln.json",
        }
    }

    #[must_use]
    pub const fn error_metric(self) -> ErrorMetric {
        match self {
            Self::RewardSplit | Self::Ln => ErrorMetric::Relative,
            // exp(x) approaches zero across the sampled domain
            Self::Exp => ErrorMetric::Absolute,
        }
    }

    /// Turn a raw candidate result into a comparable real.
    #[must_use]
    pub fn decode_output(self, raw: &IBig, precision: Precision) -> Real {
        match self {
            Self::RewardSplit => precision.from_int(raw.clone()),
            Self::Exp | Self::Ln => codec::decode(raw),
        }
    }
}

impl std::fmt::Display for CaseFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a candidate result is compared with the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMetric {
    /// `|expected - actual|`
    Absolute,
    /// `|expected - actual| / |expected|`, or the absolute error when the
    /// expected value is exactly zero.
    Relative,
}

impl ErrorMetric {
    #[must_use]
    pub fn measure(self, expected: &Real, actual: &Real, precision: Precision) -> Real {
        let diff = precision.real(abs(&(expected.clone() - actual.clone())));
        match self {
            Self::Absolute => diff,
            Self::Relative if *expected == Real::ZERO => diff,
            Self::Relative => diff / precision.real(abs(expected)),
        }
    }
}

/// The input of one case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseInput {
    Reward(Parameters),
    Scalar(Real),
}

impl CaseInput {
    /// Arguments as decimal strings: integers for the reward split,
    /// fixed-point integers for scalar inputs.
    pub fn wire_args(&self) -> Result<Vec<String>, CodecError> {
        match self {
            Self::Reward(params) => Ok(params
                .call_order()
                .iter()
                .map(|v| v.to_string())
                .collect()),
            Self::Scalar(x) => Ok(vec![codec::encode(x)?.to_string()]),
        }
    }

    /// Compact rendering used in log details and error messages.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Reward(params) => params.to_string(),
            Self::Scalar(x) => x.to_string(),
        }
    }
}
