//! Canonical high-precision number type.
//!
//! Every component works on [`Real`] internally. Conversion to other
//! representations happens only at the wire boundary ([`crate::codec`]) and
//! when rendering for display or storage.
//!
//! Working precision is carried explicitly as a [`Precision`] value instead of
//! being configured process-wide, so evaluators with different precision
//! requirements can coexist.

use std::str::FromStr;

use dashu::float::DBig;
use dashu::integer::{IBig, UBig};

use crate::error::DomainError;

/// Arbitrary-precision decimal float, rounding half away from zero.
pub type Real = DBig;

/// Working precision used when none is configured.
pub const DEFAULT_DIGITS: usize = 128;

/// Smallest working precision accepted by [`Precision::new`].
pub const MIN_DIGITS: usize = 100;

/// Number of significant decimal digits carried through arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precision {
    digits: usize,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            digits: DEFAULT_DIGITS,
        }
    }
}

impl Precision {
    /// Create a precision of `digits` significant digits.
    pub fn new(digits: usize) -> Result<Self, DomainError> {
        if digits < MIN_DIGITS {
            return Err(DomainError::PrecisionTooLow {
                requested: digits,
                minimum: MIN_DIGITS,
            });
        }
        Ok(Self { digits })
    }

    #[must_use]
    pub const fn digits(self) -> usize {
        self.digits
    }

    /// Re-round `value` to this working precision.
    #[must_use]
    pub fn real(self, value: Real) -> Real {
        value.with_precision(self.digits).value()
    }

    #[must_use]
    pub fn from_int(self, value: IBig) -> Real {
        self.real(Real::from(value))
    }

    #[must_use]
    pub fn from_uint(self, value: &UBig) -> Real {
        self.from_int(IBig::from(value.clone()))
    }

    /// `numerator / denominator` at working precision. The caller guarantees a
    /// non-zero denominator.
    #[must_use]
    pub fn ratio(self, numerator: &UBig, denominator: &UBig) -> Real {
        self.from_uint(numerator) / self.from_uint(denominator)
    }

    /// Parse a decimal literal and round it to working precision.
    pub fn parse(self, literal: &str) -> Result<Real, DomainError> {
        Real::from_str(literal.trim())
            .map(|value| self.real(value))
            .map_err(|_| DomainError::Unparseable(literal.to_string()))
    }
}

/// `|x|`.
#[must_use]
pub fn abs(x: &Real) -> Real {
    if *x < Real::ZERO { -x.clone() } else { x.clone() }
}

/// Integer part of `x`, truncating toward zero.
#[must_use]
pub fn trunc_to_int(x: &Real) -> IBig {
    x.trunc().to_int().value()
}

/// Nearest integer to `x`, ties away from zero.
#[must_use]
pub fn round_half_away(x: &Real) -> IBig {
    let half = Real::from_parts(IBig::from(5u8), -1);
    if *x < Real::ZERO {
        -((-x.clone()) + half).floor().to_int().value()
    } else {
        (x.clone() + half).floor().to_int().value()
    }
}

/// Nearest `f64`, for summaries that only need display accuracy.
#[must_use]
pub fn to_f64(x: &Real) -> f64 {
    x.to_f64().value()
}
