//! Uniform sampling over a pluggable entropy source.
//!
//! Every draw starts from a 256-bit integer `u` read from the source. Bounded
//! integers use `floor(u * (width + 1) / 2^256)`, i.e. scaling the uniform
//! fraction `u / 2^256 ∈ [0, 1)` by the range width. This has no modulo
//! reduction step and always lands inside the range.
//!
//! The source defaults to the operating system CSPRNG. Seeded sources give
//! byte-identical replays for a given seed.

use dashu::integer::{IBig, UBig};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

use crate::error::DomainError;
use crate::params::{ParameterOverrides, Parameters, default_total_bound};
use crate::real::{Precision, Real};

/// Bytes of entropy consumed per draw.
pub const ENTROPY_BYTES: usize = 32;

const ENTROPY_BITS: usize = ENTROPY_BYTES * 8;

/// Draws uniform integers, portions and reals.
pub struct RandomSampler {
    source: Box<dyn RngCore + Send>,
    precision: Precision,
}

impl std::fmt::Debug for RandomSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSampler")
            .field("precision", &self.precision)
            .finish_non_exhaustive()
    }
}

impl RandomSampler {
    /// Sampler backed by the operating system entropy source.
    #[must_use]
    pub fn from_entropy(precision: Precision) -> Self {
        Self::with_source(OsRng, precision)
    }

    /// Deterministic sampler for replayable runs.
    #[must_use]
    pub fn seeded(seed: u64, precision: Precision) -> Self {
        Self::with_source(StdRng::seed_from_u64(seed), precision)
    }

    #[must_use]
    pub fn with_source(source: impl RngCore + Send + 'static, precision: Precision) -> Self {
        Self {
            source: Box::new(source),
            precision,
        }
    }

    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    fn draw(&mut self) -> UBig {
        let mut bytes = [0u8; ENTROPY_BYTES];
        self.source.fill_bytes(&mut bytes);
        UBig::from_be_bytes(&bytes)
    }

    /// Uniform integer in `[0, total]`.
    pub fn random_portion(&mut self, total: &UBig) -> UBig {
        (self.draw() * (total + UBig::ONE)) >> ENTROPY_BITS
    }

    /// Uniform integer in `[min, max]`.
    pub fn random_integer(&mut self, min: &IBig, max: &IBig) -> Result<IBig, DomainError> {
        if min > max {
            return Err(DomainError::EmptyRange {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        let width = UBig::try_from(max - min).map_err(|_| DomainError::EmptyRange {
            min: min.to_string(),
            max: max.to_string(),
        })?;
        Ok(min + IBig::from(self.random_portion(&width)))
    }

    /// Uniform real in `[min, max)` at working precision.
    pub fn random_float(&mut self, min: &Real, max: &Real) -> Result<Real, DomainError> {
        if min >= max {
            return Err(DomainError::EmptyRange {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        let fraction = self.unit_fraction();
        let width = max.clone() - min.clone();
        Ok(self.precision.real(min.clone() + width * fraction))
    }

    /// `u / 2^256`, represented exactly as `u * 5^256 / 10^256`.
    fn unit_fraction(&mut self) -> Real {
        let u = IBig::from(self.draw());
        let significand = u * IBig::from(5u8).pow(ENTROPY_BITS);
        self.precision
            .real(Real::from_parts(significand, -(ENTROPY_BITS as isize)))
    }

    fn uint_between(&mut self, min: &UBig, max: &UBig) -> Result<UBig, DomainError> {
        let value = self.random_integer(&IBig::from(min.clone()), &IBig::from(max.clone()))?;
        UBig::try_from(value).map_err(|_| DomainError::EmptyRange {
            min: min.to_string(),
            max: max.to_string(),
        })
    }

    /// Sample a reward-split record, keeping any pinned fields.
    ///
    /// Totals are drawn from `[0, 10^27]` (rewards) and `[1, 10^27]` (fees and
    /// stake); owner shares are uniform portions of their totals.
    pub fn parameters(&mut self, overrides: &ParameterOverrides) -> Result<Parameters, DomainError> {
        let bound = default_total_bound();
        let total_rewards = match &overrides.total_rewards {
            Some(v) => v.clone(),
            None => self.uint_between(&UBig::ZERO, &bound)?,
        };
        let total_fees = match &overrides.total_fees {
            Some(v) => v.clone(),
            None => self.uint_between(&UBig::ONE, &bound)?,
        };
        let owner_fees = match &overrides.owner_fees {
            Some(v) => v.clone(),
            None => self.random_portion(&total_fees),
        };
        let total_stake = match &overrides.total_stake {
            Some(v) => v.clone(),
            None => self.uint_between(&UBig::ONE, &bound)?,
        };
        let owner_stake = match &overrides.owner_stake {
            Some(v) => v.clone(),
            None => self.random_portion(&total_stake),
        };
        Parameters::new(total_rewards, total_fees, owner_fees, total_stake, owner_stake)
    }
}
