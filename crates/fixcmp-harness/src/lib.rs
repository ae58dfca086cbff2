//! Differential testing and cost benchmarking for fixed-point routines.
//!
//! This crate provides:
//! - Invocation: the [`ContractInvoker`] capability and in-process native candidates
//! - Comparison: per-case protocol and batch runs against the arbitrary-precision reference
//! - Aggregation: streaming statistics, console summaries and dataset artifacts
//! - Structured JSONL logging with an artifact index

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod family;
pub mod invoker;
pub mod native;
pub mod report;
pub mod runner;
pub mod sample;
pub mod structured_log;

pub use config::{ConfigError, RunConfig};
pub use error::HarnessError;
pub use family::{CaseFamily, CaseInput, ErrorMetric};
pub use invoker::{BASE_CALL_COST, ContractInvoker, InvokeError};
pub use native::{NativeInvoker, NativeRoutine};
pub use report::{PairStatistics, RunStatistics};
pub use runner::{ComparisonRunner, PairRun, SampleRun};
pub use sample::{CaseOutcome, FailedCase, PairSample, RecordInput, RewardInput, Sample};
