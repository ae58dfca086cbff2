//! Comparison execution engine.
//!
//! Each case follows the same order: draw (or accept) an input, compute the
//! reference value, put the arguments on the wire, invoke the candidate(s),
//! decode, and measure. A candidate failure turns the case into a
//! [`FailedCase`] and the batch continues; a codec overflow or invalid input
//! aborts the run.

use dashu::integer::IBig;
use fixcmp_core::{ParameterOverrides, Precision, RandomSampler, Real, ReferenceEvaluator};

use crate::config::RunConfig;
use crate::error::HarnessError;
use crate::family::{CaseFamily, CaseInput};
use crate::invoker::{ContractInvoker, InvokeError, call_and_measure};
use crate::report::{PairAggregator, PairStatistics, RunStatistics, SampleAggregator};
use crate::sample::{
    CaseOutcome, DatasetRecord, FailedCase, Measurement, PairRecord, PairSample, Sample,
};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// Lower bound of sampled `exp` inputs.
pub const EXP_INPUT_MIN: i32 = -65;

/// Completed single-candidate run.
#[derive(Debug, Clone)]
pub struct SampleRun {
    pub samples: Vec<Sample>,
    pub failures: Vec<FailedCase>,
    pub statistics: RunStatistics,
}

impl SampleRun {
    #[must_use]
    pub fn records(&self) -> Vec<DatasetRecord> {
        self.samples.iter().map(Sample::to_record).collect()
    }
}

/// Completed head-to-head run.
#[derive(Debug, Clone)]
pub struct PairRun {
    pub samples: Vec<PairSample>,
    pub failures: Vec<FailedCase>,
    pub statistics: PairStatistics,
}

impl PairRun {
    #[must_use]
    pub fn records(&self) -> Vec<PairRecord> {
        self.samples.iter().map(PairSample::to_record).collect()
    }
}

/// Call one candidate and score it against `expected`.
async fn measure(
    invoker: &dyn ContractInvoker,
    args: &[String],
    family: CaseFamily,
    expected: &Real,
    precision: Precision,
) -> Result<Measurement, InvokeError> {
    let invocation = call_and_measure(invoker, args).await?;
    let output = family.decode_output(&invocation.raw, precision);
    let error = family.error_metric().measure(expected, &output, precision);
    Ok(Measurement {
        candidate: invoker.name().to_string(),
        output,
        error,
        cost: invocation.cost,
    })
}

/// Drives cases of one family against one or two candidates.
#[derive(Debug)]
pub struct ComparisonRunner {
    family: CaseFamily,
    sampler: RandomSampler,
    reference: ReferenceEvaluator,
    overrides: ParameterOverrides,
    log: Option<LogEmitter>,
}

impl ComparisonRunner {
    /// The reference evaluator runs at the sampler's precision.
    #[must_use]
    pub fn new(family: CaseFamily, sampler: RandomSampler) -> Self {
        let reference = ReferenceEvaluator::new(sampler.precision());
        Self {
            family,
            sampler,
            reference,
            overrides: ParameterOverrides::default(),
            log: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.family, config.sampler())
    }

    /// Pin reward-split parameter fields. Ignored by scalar families.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ParameterOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: LogEmitter) -> Self {
        self.log = Some(log);
        self
    }

    #[must_use]
    pub fn family(&self) -> CaseFamily {
        self.family
    }

    #[must_use]
    pub fn precision(&self) -> Precision {
        self.reference.precision()
    }

    #[must_use]
    pub fn log(&self) -> Option<&LogEmitter> {
        self.log.as_ref()
    }

    pub fn into_log(self) -> Option<LogEmitter> {
        self.log
    }

    /// Draw the next case input for this runner's family.
    pub fn next_input(&mut self) -> Result<CaseInput, HarnessError> {
        let p = self.precision();
        Ok(match self.family {
            CaseFamily::RewardSplit => CaseInput::Reward(self.sampler.parameters(&self.overrides)?),
            CaseFamily::Exp => {
                let min = p.from_int(IBig::from(EXP_INPUT_MIN));
                CaseInput::Scalar(self.sampler.random_float(&min, &Real::ZERO)?)
            }
            CaseFamily::Ln => {
                // (0, 1]
                let u = self.sampler.random_float(&Real::ZERO, &Real::ONE)?;
                CaseInput::Scalar(p.real(Real::ONE - u))
            }
        })
    }

    /// Reference value for `input`.
    pub fn expected(&self, input: &CaseInput) -> Result<Real, HarnessError> {
        let p = self.precision();
        Ok(match (self.family, input) {
            (CaseFamily::RewardSplit, CaseInput::Reward(params)) => {
                p.from_int(self.reference.reward_split(params)?)
            }
            (CaseFamily::Exp, CaseInput::Scalar(x)) => self.reference.exp(x),
            (CaseFamily::Ln, CaseInput::Scalar(x)) => self.reference.ln(x)?,
            (family, input) => {
                return Err(fixcmp_core::DomainError::Unparseable(format!(
                    "{} input for the {family} family",
                    input.render()
                ))
                .into());
            }
        })
    }

    fn emit(&mut self, entry: LogEntry) -> Result<(), HarnessError> {
        if let Some(log) = self.log.as_mut() {
            log.emit_entry(entry.with_family(self.family))?;
        }
        Ok(())
    }

    fn log_pass(&mut self, index: usize, m: &Measurement) -> Result<(), HarnessError> {
        let entry = LogEntry::new("", LogLevel::Info, "case_pass")
            .with_case(index)
            .with_candidate(&m.candidate)
            .with_outcome(Outcome::Pass)
            .with_cost(m.cost)
            .with_details(serde_json::json!({
                "output": m.output.to_string(),
                "error": m.error.to_string(),
            }));
        self.emit(entry)
    }

    fn log_fail(&mut self, failure: &FailedCase) -> Result<(), HarnessError> {
        let entry = LogEntry::new("", LogLevel::Warn, "case_fail")
            .with_case(failure.case_index)
            .with_candidate(&failure.candidate)
            .with_outcome(Outcome::Fail)
            .with_error(&failure.reason)
            .with_details(serde_json::json!({ "input": failure.input.render() }));
        self.emit(entry)
    }

    fn log_summary(&mut self, completed: usize, failed: usize) -> Result<(), HarnessError> {
        let entry = LogEntry::new("", LogLevel::Info, "run_summary").with_details(
            serde_json::json!({ "completed": completed, "failed": failed }),
        );
        self.emit(entry)?;
        if let Some(log) = self.log.as_mut() {
            log.flush()?;
        }
        Ok(())
    }

    /// Run one single-candidate case on `input`.
    pub async fn run_case(
        &mut self,
        index: usize,
        input: CaseInput,
        invoker: &dyn ContractInvoker,
    ) -> Result<CaseOutcome<Sample>, HarnessError> {
        let expected = self.expected(&input)?;
        let args = input.wire_args()?;
        match measure(invoker, &args, self.family, &expected, self.precision()).await {
            Ok(measurement) => {
                self.log_pass(index, &measurement)?;
                Ok(CaseOutcome::Passed(Sample {
                    case_index: index,
                    input,
                    expected,
                    measurement,
                }))
            }
            Err(err) => {
                let failure = FailedCase {
                    case_index: index,
                    input,
                    candidate: invoker.name().to_string(),
                    reason: err.to_string(),
                };
                self.log_fail(&failure)?;
                Ok(CaseOutcome::Failed(failure))
            }
        }
    }

    /// Run one head-to-head case on `input`. Both candidates are invoked
    /// concurrently and the case waits for both.
    pub async fn run_pair_case(
        &mut self,
        index: usize,
        input: CaseInput,
        baseline: &dyn ContractInvoker,
        candidate: &dyn ContractInvoker,
    ) -> Result<CaseOutcome<PairSample>, HarnessError> {
        let expected = self.expected(&input)?;
        let args = input.wire_args()?;
        let (family, precision) = (self.family, self.precision());
        let (old, new) = tokio::join!(
            measure(baseline, &args, family, &expected, precision),
            measure(candidate, &args, family, &expected, precision),
        );
        match (old, new) {
            (Ok(old), Ok(new)) => {
                self.log_pass(index, &old)?;
                self.log_pass(index, &new)?;
                Ok(CaseOutcome::Passed(PairSample {
                    case_index: index,
                    input,
                    expected,
                    baseline: old,
                    candidate: new,
                }))
            }
            (old, new) => {
                let mut names = Vec::new();
                let mut reasons = Vec::new();
                for (invoker, result) in [(baseline, old), (candidate, new)] {
                    if let Err(err) = result {
                        names.push(invoker.name().to_string());
                        reasons.push(err.to_string());
                    }
                }
                let failure = FailedCase {
                    case_index: index,
                    input,
                    candidate: names.join(","),
                    reason: reasons.join("; "),
                };
                self.log_fail(&failure)?;
                Ok(CaseOutcome::Failed(failure))
            }
        }
    }

    /// Run `count` sampled cases against one candidate.
    pub async fn run_samples(
        &mut self,
        count: usize,
        invoker: &dyn ContractInvoker,
    ) -> Result<SampleRun, HarnessError> {
        let mut agg = SampleAggregator::new(self.family, self.precision());
        let mut samples = Vec::with_capacity(count);
        let mut failures = Vec::new();
        for index in 0..count {
            let input = self.next_input()?;
            match self.run_case(index, input, invoker).await? {
                CaseOutcome::Passed(sample) => {
                    agg.push(&sample);
                    samples.push(sample);
                }
                CaseOutcome::Failed(failure) => {
                    agg.push_failure();
                    failures.push(failure);
                }
            }
        }
        self.log_summary(samples.len(), failures.len())?;
        Ok(SampleRun {
            samples,
            failures,
            statistics: agg.finish(),
        })
    }

    /// Run `count` sampled head-to-head cases.
    pub async fn run_pairs(
        &mut self,
        count: usize,
        baseline: &dyn ContractInvoker,
        candidate: &dyn ContractInvoker,
    ) -> Result<PairRun, HarnessError> {
        let mut agg = PairAggregator::new(self.precision());
        let mut samples = Vec::with_capacity(count);
        let mut failures = Vec::new();
        for index in 0..count {
            let input = self.next_input()?;
            match self.run_pair_case(index, input, baseline, candidate).await? {
                CaseOutcome::Passed(sample) => {
                    agg.push(&sample);
                    samples.push(sample);
                }
                CaseOutcome::Failed(failure) => {
                    agg.push_failure();
                    failures.push(failure);
                }
            }
        }
        self.log_summary(samples.len(), failures.len())?;
        Ok(PairRun {
            samples,
            failures,
            statistics: agg.finish(),
        })
    }
}
