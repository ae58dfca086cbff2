//! Run configuration.
//!
//! The sample count is read from the `SAMPLES` environment variable and falls
//! back to the per-family default when unset or empty. `FIXCMP_SEED` (decimal
//! or `0x` hex) switches the sampler to a seeded source for replayable runs.

use std::path::PathBuf;

use fixcmp_core::{Precision, RandomSampler};
use thiserror::Error;

use crate::family::CaseFamily;

pub const SAMPLES_ENV: &str = "SAMPLES";
pub const SEED_ENV: &str = "FIXCMP_SEED";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("SAMPLES must be a positive integer, got `{0}`")]
    InvalidSamples(String),
    #[error("invalid seed `{0}`: expected decimal or 0x-prefixed hex")]
    InvalidSeed(String),
}

/// Parse a sample count. `None` and blank input select `default`.
pub fn parse_samples(raw: Option<&str>, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidSamples(raw.to_string())),
    }
}

/// Sample count from `SAMPLES`.
pub fn samples_from_env(default: usize) -> Result<usize, ConfigError> {
    let raw = std::env::var(SAMPLES_ENV).ok();
    parse_samples(raw.as_deref(), default)
}

/// Parse a seed written in decimal or `0x` hex, with optional `_` separators.
pub fn parse_seed(raw: &str) -> Result<u64, ConfigError> {
    let s = raw.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(&hex.replace('_', ""), 16)
    } else {
        s.replace('_', "").parse::<u64>()
    };
    parsed.map_err(|_| ConfigError::InvalidSeed(raw.to_string()))
}

/// Seed from `FIXCMP_SEED`, if set.
pub fn seed_from_env() -> Result<Option<u64>, ConfigError> {
    match std::env::var(SEED_ENV) {
        Ok(raw) if !raw.trim().is_empty() => parse_seed(&raw).map(Some),
        _ => Ok(None),
    }
}

/// Everything a batch run needs besides the candidates themselves.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub family: CaseFamily,
    pub samples: usize,
    pub seed: Option<u64>,
    pub precision: Precision,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Defaults for `family` with no environment applied.
    #[must_use]
    pub fn new(family: CaseFamily) -> Self {
        Self {
            family,
            samples: family.default_samples(),
            seed: None,
            precision: Precision::default(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Defaults for `family` with `SAMPLES` and `FIXCMP_SEED` applied.
    pub fn from_env(family: CaseFamily) -> Result<Self, ConfigError> {
        let mut config = Self::new(family);
        config.samples = samples_from_env(family.default_samples())?;
        config.seed = seed_from_env()?;
        Ok(config)
    }

    #[must_use]
    pub fn sampler(&self) -> RandomSampler {
        match self.seed {
            Some(seed) => RandomSampler::seeded(seed, self.precision),
            None => RandomSampler::from_entropy(self.precision),
        }
    }

    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.output_dir.join(self.family.dataset_path())
    }
}
