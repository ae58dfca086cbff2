//! Numeric core of the fixcmp differential harness.
//!
//! This crate provides:
//! - [`real`]: the canonical high-precision number type and working precision
//! - [`codec`]: conversion between reals and 2^127-scaled fixed-point integers
//! - [`params`]: reward-split parameter records and their invariants
//! - [`sampler`]: uniform sampling over a pluggable entropy source
//! - [`reference`]: arbitrary-precision oracle for the formulas under test

pub mod codec;
pub mod error;
pub mod params;
pub mod real;
pub mod reference;
pub mod sampler;

pub use error::{CodecError, DomainError};
pub use params::{ParameterOverrides, Parameters};
pub use real::{Precision, Real};
pub use reference::ReferenceEvaluator;
pub use sampler::RandomSampler;
