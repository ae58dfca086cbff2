//! Integration test: batch runs end to end with injected candidates.
//!
//! Validates that:
//! 1. Seeded runs reproduce identical sample sequences and dataset bytes.
//! 2. A failing invocation is isolated; statistics cover the remaining cases,
//!    for single-candidate and head-to-head runs alike.
//! 3. Head-to-head candidates are invoked concurrently behind a join barrier.
//! 4. Structured logs written by a run validate against the schema.
//!
//! Run: cargo test -p fixcmp-harness --test comparison_runner_test

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashu::integer::IBig;
use fixcmp_core::{Precision, RandomSampler};
use fixcmp_harness::report::render_dataset;
use fixcmp_harness::structured_log::{LogEmitter, validate_log_line};
use fixcmp_harness::{
    BASE_CALL_COST, CaseFamily, ComparisonRunner, ContractInvoker, InvokeError, NativeInvoker,
    NativeRoutine,
};

/// Returns the fixed-point argument halved; fails on chosen call numbers.
struct Halving {
    name: &'static str,
    calls: AtomicUsize,
    fail_on: Option<usize>,
}

impl Halving {
    fn new(fail_on: Option<usize>) -> Self {
        Self {
            name: "halving",
            calls: AtomicUsize::new(0),
            fail_on,
        }
    }

    fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

#[async_trait]
impl ContractInvoker for Halving {
    fn name(&self) -> &str {
        self.name
    }

    async fn evaluate(&self, args: &[String]) -> Result<String, InvokeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if Some(call) == self.fail_on {
            return Err(InvokeError::Rejected {
                candidate: self.name().to_string(),
                reason: "reverted".to_string(),
            });
        }
        let n: IBig = args[0].parse().map_err(|_| InvokeError::MalformedResult {
            candidate: self.name().to_string(),
            raw: args[0].clone(),
        })?;
        Ok((n / IBig::from(2u8)).to_string())
    }

    async fn estimate_cost(&self, args: &[String]) -> Result<u64, InvokeError> {
        Ok(BASE_CALL_COST + 100 + args[0].len() as u64)
    }
}

fn runner(family: CaseFamily, seed: u64) -> ComparisonRunner {
    ComparisonRunner::new(family, RandomSampler::seeded(seed, Precision::default()))
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let first = runner(CaseFamily::Ln, 42)
        .run_samples(10, &Halving::new(None))
        .await
        .unwrap();
    let second = runner(CaseFamily::Ln, 42)
        .run_samples(10, &Halving::new(None))
        .await
        .unwrap();

    assert_eq!(first.samples.len(), 10);
    assert_eq!(first.samples, second.samples);
    assert_eq!(
        render_dataset(&first.records()).unwrap(),
        render_dataset(&second.records()).unwrap()
    );
    assert_eq!(first.statistics, second.statistics);

    let other = runner(CaseFamily::Ln, 43)
        .run_samples(10, &Halving::new(None))
        .await
        .unwrap();
    assert_ne!(first.records(), other.records());
}

#[tokio::test]
async fn one_failed_case_is_excluded_from_statistics() {
    let n = 8;
    let run = runner(CaseFamily::Exp, 7)
        .run_samples(n, &Halving::new(Some(3)))
        .await
        .unwrap();

    assert_eq!(run.samples.len(), n - 1);
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].case_index, 3);
    assert!(run.failures[0].reason.contains("reverted"));
    assert!(run.samples.iter().all(|s| s.case_index != 3));

    let stats = &run.statistics;
    assert_eq!(stats.completed, n - 1);
    assert_eq!(stats.failed, 1);
    assert!(stats.mean_error.is_some());
    let expected_mean_cost = run
        .samples
        .iter()
        .map(|s| s.measurement.cost as f64)
        .sum::<f64>()
        / (n - 1) as f64;
    assert_eq!(stats.mean_cost, Some(expected_mean_cost));
}

#[tokio::test]
async fn failed_pair_case_names_the_failing_candidate() {
    let n = 6;
    let old = Halving::new(None).named("old");
    let new = Halving::new(Some(2)).named("new");
    let run = runner(CaseFamily::Exp, 9)
        .run_pairs(n, &old, &new)
        .await
        .unwrap();

    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].case_index, 2);
    assert_eq!(run.failures[0].candidate, "new");
    assert!(run.failures[0].reason.contains("reverted"));
    assert_eq!(run.samples.len(), n - 1);
    assert!(run.samples.iter().all(|s| s.case_index != 2));
    assert_eq!(run.records().len(), n - 1);
    assert_eq!(run.statistics.completed, n - 1);
    assert_eq!(run.statistics.failed, 1);
    // identical candidates: every completed case costs the same
    assert_eq!(run.statistics.mean_cost_delta, Some(0.0));
}

#[tokio::test]
async fn pair_case_failing_on_both_sides_lists_both() {
    let n = 4;
    let old = Halving::new(Some(1)).named("old");
    let new = Halving::new(Some(1)).named("new");
    let run = runner(CaseFamily::Ln, 3)
        .run_pairs(n, &old, &new)
        .await
        .unwrap();

    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].candidate, "old,new");
    assert_eq!(run.failures[0].reason.matches("reverted").count(), 2);
    assert!(run.failures[0].reason.contains("; "));
    assert_eq!(run.statistics.completed, n - 1);
    assert_eq!(run.statistics.failed, 1);
}

/// Refuses to finish until its partner has started.
struct Rendezvous {
    name: &'static str,
    mine: Arc<AtomicBool>,
    theirs: Arc<AtomicBool>,
    cost: u64,
}

#[async_trait]
impl ContractInvoker for Rendezvous {
    fn name(&self) -> &str {
        self.name
    }

    async fn evaluate(&self, _args: &[String]) -> Result<String, InvokeError> {
        self.mine.store(true, Ordering::SeqCst);
        for _ in 0..1_000 {
            if self.theirs.load(Ordering::SeqCst) {
                return Ok("500000".to_string());
            }
            tokio::task::yield_now().await;
        }
        Err(InvokeError::Rejected {
            candidate: self.name.to_string(),
            reason: "partner never started".to_string(),
        })
    }

    async fn estimate_cost(&self, _args: &[String]) -> Result<u64, InvokeError> {
        Ok(BASE_CALL_COST + self.cost)
    }
}

#[tokio::test]
async fn pair_candidates_run_concurrently() {
    use dashu::integer::UBig;
    use fixcmp_core::ParameterOverrides;

    let (a, b) = (Arc::new(AtomicBool::new(false)), Arc::new(AtomicBool::new(false)));
    let old = Rendezvous {
        name: "old",
        mine: Arc::clone(&a),
        theirs: Arc::clone(&b),
        cost: 9_000,
    };
    let new = Rendezvous {
        name: "new",
        mine: b,
        theirs: a,
        cost: 4_000,
    };
    let overrides = ParameterOverrides::default()
        .with_total_rewards(UBig::from(1_000_000u32))
        .with_fees(UBig::from(50u8), UBig::from(100u8))
        .with_stake(UBig::from(50u8), UBig::from(100u8));

    let run = runner(CaseFamily::RewardSplit, 1)
        .with_overrides(overrides)
        .run_pairs(3, &old, &new)
        .await
        .unwrap();

    assert!(run.failures.is_empty(), "{:?}", run.failures);
    for sample in &run.samples {
        assert_eq!(sample.cost_delta(), -5_000);
        assert_eq!(sample.candidate.error, sample.baseline.error);
    }
    assert_eq!(run.statistics.mean_cost_savings, Some(5_000.0));
    assert_eq!(run.statistics.mean_new_cost, Some(4_000.0));
    // both exact: ratio 1, not unbounded
    assert_eq!(run.statistics.unbounded_improvements, 0);
    assert_eq!(run.records()[0].cost_delta, -5_000);
}

#[tokio::test]
async fn native_reward_run_logs_every_case() {
    let precision = Precision::default();
    let old = NativeInvoker::new(NativeRoutine::RewardPowf, precision);
    let new = NativeInvoker::new(NativeRoutine::RewardExpLn, precision);
    let mut runner = runner(CaseFamily::RewardSplit, 0xDEAD_BEEF)
        .with_log(LogEmitter::to_buffer(CaseFamily::RewardSplit, "test-run"));

    let run = runner.run_pairs(6, &old, &new).await.unwrap();
    assert_eq!(run.samples.len() + run.failures.len(), 6);

    let log = runner.into_log().unwrap();
    let text = log.buffer_contents().unwrap().to_string();
    let entries: Vec<_> = text
        .lines()
        .enumerate()
        .map(|(i, line)| validate_log_line(line, i + 1).unwrap())
        .collect();
    let passes = entries.iter().filter(|e| e.event == "case_pass").count();
    let fails = entries.iter().filter(|e| e.event == "case_fail").count();
    assert_eq!(passes, 2 * run.samples.len());
    assert_eq!(fails, run.failures.len());
    let summary = entries.last().unwrap();
    assert_eq!(summary.event, "run_summary");
    assert!(summary.trace_id.starts_with("reward_split::test-run::"));
    assert!(
        entries
            .iter()
            .all(|e| e.family.as_deref() == Some("reward_split"))
    );
}
