//! Arbitrary-precision oracle for the formulas under test.
//!
//! The reward split is the weighted geometric mean
//! `total_rewards * fee_ratio^alpha * stake_ratio^(1 - alpha)` with
//! `alpha = 1/6`. Its integer reference rounds to nearest, ties away from
//! zero. That rule is the baseline every candidate error is measured
//! against.

use dashu::integer::{IBig, UBig};

use crate::error::DomainError;
use crate::params::Parameters;
use crate::real::{Precision, Real, round_half_away};

/// Numerator and denominator of the fee exponent `alpha`.
pub const ALPHA: (u8, u8) = (1, 6);

/// Computes ground-truth values at a configured working precision.
#[derive(Debug, Clone)]
pub struct ReferenceEvaluator {
    precision: Precision,
    alpha: Real,
    one: Real,
}

impl Default for ReferenceEvaluator {
    fn default() -> Self {
        Self::new(Precision::default())
    }
}

impl ReferenceEvaluator {
    #[must_use]
    pub fn new(precision: Precision) -> Self {
        let one = precision.from_int(IBig::ONE);
        let alpha =
            precision.from_int(IBig::from(ALPHA.0)) / precision.from_int(IBig::from(ALPHA.1));
        Self {
            precision,
            alpha,
            one,
        }
    }

    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[must_use]
    pub fn alpha(&self) -> &Real {
        &self.alpha
    }

    /// `(owner_fees / total_fees, owner_stake / total_stake)`.
    pub fn ratios(&self, params: &Parameters) -> Result<(Real, Real), DomainError> {
        if *params.total_fees() == UBig::ZERO {
            return Err(DomainError::ZeroDenominator {
                field: "total_fees",
            });
        }
        if *params.total_stake() == UBig::ZERO {
            return Err(DomainError::ZeroDenominator {
                field: "total_stake",
            });
        }
        Ok((
            self.precision.ratio(params.owner_fees(), params.total_fees()),
            self.precision
                .ratio(params.owner_stake(), params.total_stake()),
        ))
    }

    /// Reward split before integer rounding.
    pub fn reward_split_exact(&self, params: &Parameters) -> Result<Real, DomainError> {
        let (fee_ratio, stake_ratio) = self.ratios(params)?;
        let stake_exponent = self.one.clone() - self.alpha.clone();
        let weight = self.pow(&fee_ratio, &self.alpha) * self.pow(&stake_ratio, &stake_exponent);
        let rewards = self.precision.from_uint(params.total_rewards());
        Ok(self.precision.real(weight * rewards))
    }

    /// Reward split rounded to the nearest integer.
    pub fn reward_split(&self, params: &Parameters) -> Result<IBig, DomainError> {
        self.reward_split_exact(params).map(|v| round_half_away(&v))
    }

    /// `e^x`.
    #[must_use]
    pub fn exp(&self, x: &Real) -> Real {
        self.precision.real(x.clone()).exp()
    }

    /// Natural logarithm, defined for `x > 0`.
    pub fn ln(&self, x: &Real) -> Result<Real, DomainError> {
        if *x <= Real::ZERO {
            return Err(DomainError::NonPositiveLogArgument(x.to_string()));
        }
        Ok(self.precision.real(x.clone()).ln())
    }

    /// `base^exponent` for `base >= 0` and `exponent > 0`.
    fn pow(&self, base: &Real, exponent: &Real) -> Real {
        if *base == Real::ZERO {
            return self.precision.real(Real::ZERO);
        }
        if *base == self.one {
            return self.one.clone();
        }
        let ln_base = self.precision.real(base.clone()).ln();
        self.precision.real(ln_base * exponent.clone()).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::{abs, to_f64};

    fn params(rewards: u64, fees: (u64, u64), stake: (u64, u64)) -> Parameters {
        Parameters::new(
            UBig::from(rewards),
            UBig::from(fees.1),
            UBig::from(fees.0),
            UBig::from(stake.1),
            UBig::from(stake.0),
        )
        .unwrap()
    }

    #[test]
    fn equal_ratios_yield_the_ratio() {
        let eval = ReferenceEvaluator::default();
        let p = params(1_000_000, (50, 100), (50, 100));
        assert_eq!(eval.reward_split(&p).unwrap(), IBig::from(500_000));
    }

    #[test]
    fn zero_rewards_yield_zero() {
        let eval = ReferenceEvaluator::default();
        let p = params(0, (3, 7), (11, 13));
        assert_eq!(eval.reward_split(&p).unwrap(), IBig::ZERO);
    }

    #[test]
    fn zero_owner_share_yields_zero() {
        let eval = ReferenceEvaluator::default();
        assert_eq!(
            eval.reward_split(&params(1_000, (0, 10), (5, 10))).unwrap(),
            IBig::ZERO
        );
        assert_eq!(
            eval.reward_split(&params(1_000, (5, 10), (0, 10))).unwrap(),
            IBig::ZERO
        );
    }

    #[test]
    fn full_shares_yield_total() {
        let eval = ReferenceEvaluator::default();
        let p = params(987_654_321, (10, 10), (4, 4));
        assert_eq!(eval.reward_split(&p).unwrap(), IBig::from(987_654_321));
    }

    #[test]
    fn matches_closed_form_in_f64() {
        let eval = ReferenceEvaluator::default();
        let p = params(1_000_000_000, (1, 4), (3, 4));
        let expected = 1e9 * 0.25f64.powf(1.0 / 6.0) * 0.75f64.powf(5.0 / 6.0);
        let got = to_f64(&eval.reward_split_exact(&p).unwrap());
        assert!((got - expected).abs() < 1e-3, "{got} vs {expected}");
    }

    #[test]
    fn monotone_in_owner_fees() {
        let eval = ReferenceEvaluator::default();
        let mut previous = IBig::from(-1);
        for owner in (0..=1000).step_by(50) {
            let v = eval
                .reward_split(&params(1_000_000_000_000, (owner, 1000), (400, 1000)))
                .unwrap();
            assert!(v >= previous, "owner_fees={owner}");
            previous = v;
        }
    }

    #[test]
    fn monotone_in_owner_stake() {
        let eval = ReferenceEvaluator::default();
        let mut previous = IBig::from(-1);
        for owner in (0..=1000).step_by(50) {
            let v = eval
                .reward_split(&params(1_000_000_000_000, (400, 1000), (owner, 1000)))
                .unwrap();
            assert!(v >= previous, "owner_stake={owner}");
            previous = v;
        }
    }

    #[test]
    fn exp_and_ln_are_inverse() {
        let eval = ReferenceEvaluator::default();
        let p = eval.precision();
        let x = p.parse("0.3141592653589793238462643383279").unwrap();
        let back = eval.exp(&eval.ln(&x).unwrap());
        let tolerance = p.parse("1e-100").unwrap();
        assert!(abs(&(back - x)) < tolerance);
    }

    #[test]
    fn exp_special_values() {
        let eval = ReferenceEvaluator::default();
        let p = eval.precision();
        let tolerance = p.parse("1e-120").unwrap();
        let one = eval.exp(&p.parse("0").unwrap());
        assert!(abs(&(one - Real::ONE)) < tolerance);
        let tiny = to_f64(&eval.exp(&p.parse("-65").unwrap()));
        assert!((tiny - (-65f64).exp()).abs() < 1e-40);
    }

    #[test]
    fn ln_rejects_non_positive() {
        let eval = ReferenceEvaluator::default();
        let p = eval.precision();
        assert!(matches!(
            eval.ln(&p.parse("0").unwrap()),
            Err(DomainError::NonPositiveLogArgument(_))
        ));
        assert!(eval.ln(&p.parse("-1").unwrap()).is_err());
        let zero = eval.ln(&p.parse("1").unwrap()).unwrap();
        assert!(abs(&zero) < p.parse("1e-120").unwrap());
    }
}
