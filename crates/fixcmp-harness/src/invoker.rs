//! Candidate invocation seam.
//!
//! A candidate routine is reached only through [`ContractInvoker`]: a
//! read-only `evaluate` returning the numeric result and an `estimate_cost`
//! returning the gross execution cost. Arguments travel as decimal-string
//! integers in both directions.

use async_trait::async_trait;
use dashu::integer::IBig;
use thiserror::Error;

/// Fixed per-call cost subtracted from every estimate.
pub const BASE_CALL_COST: u64 = 21_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("{candidate} rejected the call: {reason}")]
    Rejected { candidate: String, reason: String },
    #[error("{candidate} returned a malformed result `{raw}`")]
    MalformedResult { candidate: String, raw: String },
    #[error("{candidate} reported a cost of {cost} that does not fit in i64")]
    CostOutOfRange { candidate: String, cost: u64 },
}

/// Capability to call one candidate routine.
#[async_trait]
pub trait ContractInvoker: Send + Sync {
    /// Stable identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Evaluate the routine and return its result as a decimal integer.
    async fn evaluate(&self, args: &[String]) -> Result<String, InvokeError>;

    /// Estimate the gross execution cost of the same call.
    async fn estimate_cost(&self, args: &[String]) -> Result<u64, InvokeError>;
}

/// Result and net cost of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub raw: IBig,
    /// Estimated cost minus [`BASE_CALL_COST`]; negative when the estimate is
    /// below the baseline.
    pub cost: i64,
}

/// Evaluate and cost one call.
pub async fn call_and_measure(
    invoker: &dyn ContractInvoker,
    args: &[String],
) -> Result<Invocation, InvokeError> {
    let text = invoker.evaluate(args).await?;
    let raw = text
        .trim()
        .parse::<IBig>()
        .map_err(|_| InvokeError::MalformedResult {
            candidate: invoker.name().to_string(),
            raw: text.clone(),
        })?;
    let gross = invoker.estimate_cost(args).await?;
    let gross = i64::try_from(gross).map_err(|_| InvokeError::CostOutOfRange {
        candidate: invoker.name().to_string(),
        cost: gross,
    })?;
    Ok(Invocation {
        raw,
        cost: gross - BASE_CALL_COST as i64,
    })
}
