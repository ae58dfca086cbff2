//! Streaming aggregation of completed cases and the two report outputs:
//! a console summary and a per-case dataset artifact.
//!
//! Aggregators keep running sums only. Means are taken over completed cases;
//! failed cases are counted but contribute nothing else.

use std::path::{Path, PathBuf};

use dashu::integer::IBig;
use fixcmp_core::real::to_f64;
use fixcmp_core::{Precision, Real};
use serde::Serialize;

use crate::error::HarnessError;
use crate::family::CaseFamily;
use crate::sample::{Improvement, PairSample, Sample};

fn mean(sum: &Real, count: usize, precision: Precision) -> Option<Real> {
    (count > 0).then(|| precision.real(sum.clone() / precision.from_int(IBig::from(count))))
}

fn mean_i128(sum: i128, count: usize) -> Option<f64> {
    (count > 0).then(|| sum as f64 / count as f64)
}

fn fmt_real(value: Option<&Real>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| to_f64(v).to_string())
}

fn fmt_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

// ---------------------------------------------------------------------------
// Single-candidate runs
// ---------------------------------------------------------------------------

/// Running totals over single-candidate samples.
#[derive(Debug, Clone)]
pub struct SampleAggregator {
    family: CaseFamily,
    precision: Precision,
    completed: usize,
    failed: usize,
    error_sum: Real,
    cost_sum: i128,
    error_range: Option<(Real, Real)>,
}

impl SampleAggregator {
    #[must_use]
    pub fn new(family: CaseFamily, precision: Precision) -> Self {
        Self {
            family,
            precision,
            completed: 0,
            failed: 0,
            error_sum: Real::ZERO,
            cost_sum: 0,
            error_range: None,
        }
    }

    pub fn push(&mut self, sample: &Sample) {
        let m = &sample.measurement;
        self.completed += 1;
        self.error_sum = self.precision.real(self.error_sum.clone() + m.error.clone());
        self.cost_sum += i128::from(m.cost);
        self.error_range = Some(match self.error_range.take() {
            None => (m.error.clone(), m.error.clone()),
            Some((lo, hi)) => (
                if m.error < lo { m.error.clone() } else { lo },
                if m.error > hi { m.error.clone() } else { hi },
            ),
        });
    }

    pub fn push_failure(&mut self) {
        self.failed += 1;
    }

    #[must_use]
    pub fn finish(self) -> RunStatistics {
        RunStatistics {
            family: self.family,
            completed: self.completed,
            failed: self.failed,
            mean_error: mean(&self.error_sum, self.completed, self.precision),
            mean_cost: mean_i128(self.cost_sum, self.completed),
            error_range: self.error_range,
        }
    }
}

/// Final statistics of a single-candidate run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub family: CaseFamily,
    pub completed: usize,
    pub failed: usize,
    /// `None` when no case completed.
    pub mean_error: Option<Real>,
    pub mean_cost: Option<f64>,
    /// Observed `[min, max]` error.
    pub error_range: Option<(Real, Real)>,
}

impl RunStatistics {
    /// Fold a completed sample sequence plus a failure count.
    #[must_use]
    pub fn from_samples(
        family: CaseFamily,
        precision: Precision,
        samples: &[Sample],
        failed: usize,
    ) -> Self {
        let mut agg = SampleAggregator::new(family, precision);
        samples.iter().for_each(|s| agg.push(s));
        (0..failed).for_each(|_| agg.push_failure());
        agg.finish()
    }

    /// Console summary lines.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} ({} error): {} completed, {} failed\n",
            self.family,
            match self.family.error_metric() {
                crate::family::ErrorMetric::Absolute => "absolute",
                crate::family::ErrorMetric::Relative => "relative",
            },
            self.completed,
            self.failed
        ));
        out.push_str(&format!(
            "Average error: {}\n",
            fmt_real(self.mean_error.as_ref())
        ));
        out.push_str(&format!("Average cost: {}\n", fmt_f64(self.mean_cost)));
        if let Some((lo, hi)) = &self.error_range {
            out.push_str(&format!("Error range: [{}, {}]\n", to_f64(lo), to_f64(hi)));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Head-to-head runs
// ---------------------------------------------------------------------------

/// Running totals over head-to-head samples.
#[derive(Debug, Clone)]
pub struct PairAggregator {
    precision: Precision,
    completed: usize,
    failed: usize,
    savings_sum: i128,
    new_cost_sum: i128,
    new_error_sum: Real,
    error_delta_sum: Real,
    ratio_sum: Real,
    ratio_count: usize,
    unbounded: usize,
}

impl PairAggregator {
    #[must_use]
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            completed: 0,
            failed: 0,
            savings_sum: 0,
            new_cost_sum: 0,
            new_error_sum: Real::ZERO,
            error_delta_sum: Real::ZERO,
            ratio_sum: Real::ZERO,
            ratio_count: 0,
            unbounded: 0,
        }
    }

    pub fn push(&mut self, sample: &PairSample) {
        let p = self.precision;
        self.completed += 1;
        self.savings_sum -= i128::from(sample.cost_delta());
        self.new_cost_sum += i128::from(sample.candidate.cost);
        self.new_error_sum = p.real(self.new_error_sum.clone() + sample.candidate.error.clone());
        self.error_delta_sum = p.real(self.error_delta_sum.clone() + sample.error_delta());
        match sample.improvement() {
            Improvement::Ratio(r) => {
                self.ratio_sum = p.real(self.ratio_sum.clone() + r);
                self.ratio_count += 1;
            }
            Improvement::Unbounded => self.unbounded += 1,
        }
    }

    pub fn push_failure(&mut self) {
        self.failed += 1;
    }

    #[must_use]
    pub fn finish(self) -> PairStatistics {
        let p = self.precision;
        PairStatistics {
            completed: self.completed,
            failed: self.failed,
            mean_cost_savings: mean_i128(self.savings_sum, self.completed),
            mean_cost_delta: mean_i128(-self.savings_sum, self.completed),
            mean_improvement: mean(&self.ratio_sum, self.ratio_count, p),
            unbounded_improvements: self.unbounded,
            mean_new_error: mean(&self.new_error_sum, self.completed, p),
            mean_error_delta: mean(&self.error_delta_sum, self.completed, p),
            mean_new_cost: mean_i128(self.new_cost_sum, self.completed),
        }
    }
}

/// Final statistics of a head-to-head run.
#[derive(Debug, Clone, PartialEq)]
pub struct PairStatistics {
    pub completed: usize,
    pub failed: usize,
    /// Mean of `cost(old) - cost(new)`.
    pub mean_cost_savings: Option<f64>,
    /// Mean of `cost(new) - cost(old)`.
    pub mean_cost_delta: Option<f64>,
    /// Mean `old_error / new_error` over cases where it is finite.
    pub mean_improvement: Option<Real>,
    /// Cases where the candidate was exact and the baseline was not.
    pub unbounded_improvements: usize,
    pub mean_new_error: Option<Real>,
    pub mean_error_delta: Option<Real>,
    pub mean_new_cost: Option<f64>,
}

impl PairStatistics {
    #[must_use]
    pub fn from_samples(precision: Precision, samples: &[PairSample], failed: usize) -> Self {
        let mut agg = PairAggregator::new(precision);
        samples.iter().for_each(|s| agg.push(s));
        (0..failed).for_each(|_| agg.push_failure());
        agg.finish()
    }

    /// Console summary lines. Errors use the reward split's metric.
    #[must_use]
    pub fn render(&self) -> String {
        let metric = match CaseFamily::RewardSplit.error_metric() {
            crate::family::ErrorMetric::Absolute => "absolute",
            crate::family::ErrorMetric::Relative => "relative",
        };
        let mut out = String::new();
        out.push_str(&format!(
            "{} ({metric} error): {} completed, {} failed\n",
            CaseFamily::RewardSplit,
            self.completed,
            self.failed
        ));
        out.push_str(&format!(
            "Average cost savings: {}\n",
            fmt_f64(self.mean_cost_savings)
        ));
        out.push_str(&format!(
            "Average cost delta: {}\n",
            fmt_f64(self.mean_cost_delta)
        ));
        out.push_str(&format!(
            "Average error improvement: {}",
            fmt_real(self.mean_improvement.as_ref())
        ));
        if self.unbounded_improvements > 0 {
            out.push_str(&format!(
                " ({} cases exact, excluded)",
                self.unbounded_improvements
            ));
        }
        out.push('\n');
        out.push_str(&format!(
            "Average error delta ({metric}): {}\n",
            fmt_real(self.mean_error_delta.as_ref())
        ));
        out.push_str(&format!(
            "Average new error ({metric}): {}\n",
            fmt_real(self.mean_new_error.as_ref())
        ));
        out.push_str(&format!(
            "Average new cost: {}\n",
            fmt_f64(self.mean_new_cost)
        ));
        out
    }
}

// ---------------------------------------------------------------------------
// Dataset artifact
// ---------------------------------------------------------------------------

/// A dataset file that has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetArtifact {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Serialize records as an indented JSON array.
pub fn render_dataset<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Write records to `path`, creating parent directories.
pub fn write_dataset<T: Serialize>(
    path: &Path,
    records: &[T],
) -> Result<DatasetArtifact, HarnessError> {
    use sha2::Digest;

    let body = render_dataset(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &body)?;
    Ok(DatasetArtifact {
        path: path.to_path_buf(),
        sha256: hex_lower(&sha2::Sha256::digest(body.as_bytes())),
        size_bytes: body.len() as u64,
    })
}
