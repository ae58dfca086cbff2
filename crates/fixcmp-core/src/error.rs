//! Error types for domain validation and fixed-point representation.

use thiserror::Error;

/// An input violates a precondition of the formula or sampler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{field} is a denominator and must be at least 1")]
    ZeroDenominator { field: &'static str },
    #[error("{part} exceeds {whole}")]
    PortionExceedsTotal {
        part: &'static str,
        whole: &'static str,
    },
    #[error("{field} does not fit in 256 bits")]
    OutOfRange { field: &'static str },
    #[error("empty range: min {min} is greater than max {max}")]
    EmptyRange { min: String, max: String },
    #[error("natural logarithm is undefined for {0}")]
    NonPositiveLogArgument(String),
    #[error("precision of {requested} digits is below the minimum of {minimum}")]
    PrecisionTooLow { requested: usize, minimum: usize },
    #[error("cannot parse `{0}` as a decimal number")]
    Unparseable(String),
}

/// A value cannot be carried in the fixed-point wire format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("fixed-point value {value} overflows the signed {bits}-bit wire range")]
    Overflow { value: String, bits: usize },
}
