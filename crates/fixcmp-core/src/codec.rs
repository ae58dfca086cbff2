//! Fixed-point codec.
//!
//! A fixed-point value is a signed integer `n` standing for the real number
//! `n / 2^127`. Candidates exchange these integers as decimal strings, and the
//! signed 256-bit word bounds what can be carried on the wire.
//!
//! Both directions are computed on exact integers:
//! - `encode(x) = trunc(x * 2^127)`, truncating toward zero.
//! - `decode(n) = n * 5^127 / 10^127`, which is exactly `n / 2^127` because a
//!   negative power of two always has a finite decimal expansion.

use dashu::integer::IBig;

use crate::error::CodecError;
use crate::real::Real;

/// Number of fractional bits in the fixed-point format.
pub const FRACTION_BITS: usize = 127;

/// Width of the signed wire word.
pub const WIRE_BITS: usize = 256;

/// `2^127`, the fixed-point representation of `1`.
#[must_use]
pub fn scale() -> IBig {
    IBig::ONE << FRACTION_BITS
}

fn wire_limit() -> IBig {
    IBig::ONE << (WIRE_BITS - 1)
}

fn pow10(exponent: usize) -> IBig {
    IBig::from(10u8).pow(exponent)
}

/// Encode `x` as a fixed-point integer, truncating toward zero.
///
/// Fails only when the scaled value leaves the signed 256-bit range, which
/// means a sampler produced an input outside the harness operating range.
pub fn encode(x: &Real) -> Result<IBig, CodecError> {
    let repr = x.repr();
    let shifted = repr.significand().clone() << FRACTION_BITS;
    let exponent = repr.exponent();
    let fixed = if exponent >= 0 {
        shifted * pow10(exponent.unsigned_abs())
    } else {
        // IBig division truncates toward zero.
        shifted / pow10(exponent.unsigned_abs())
    };

    let limit = wire_limit();
    if fixed >= limit || fixed < -limit {
        return Err(CodecError::Overflow {
            value: x.to_string(),
            bits: WIRE_BITS,
        });
    }
    Ok(fixed)
}

/// Decode a fixed-point integer into the exact real it represents.
#[must_use]
pub fn decode(n: &IBig) -> Real {
    let significand = n * IBig::from(5u8).pow(FRACTION_BITS);
    Real::from_parts(significand, -(FRACTION_BITS as isize))
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::*;
    use crate::real::{Precision, abs};

    #[test]
    fn one_encodes_to_scale() {
        let p = Precision::default();
        assert_eq!(encode(&p.parse("1").unwrap()).unwrap(), scale());
        assert_eq!(decode(&scale()).cmp(&Real::ONE), Ordering::Equal);
    }

    #[test]
    fn encode_truncates_toward_zero() {
        let p = Precision::default();
        // 2^-128 is half of one unit and must truncate to zero in both signs.
        let half_unit = decode(&IBig::ONE) / p.from_int(IBig::from(2u8));
        assert_eq!(encode(&half_unit).unwrap(), IBig::ZERO);
        assert_eq!(encode(&-half_unit).unwrap(), IBig::ZERO);

        let x = p.parse("-0.75").unwrap();
        let expected = -(scale() * IBig::from(3u8) / IBig::from(4u8));
        assert_eq!(encode(&x).unwrap(), expected);
    }

    #[test]
    fn decode_is_exact_for_one_unit() {
        // 2^-127 = 5^127 / 10^127
        let unit = decode(&IBig::ONE);
        let recovered = encode(&unit).unwrap();
        assert_eq!(recovered, IBig::ONE);
    }

    #[test]
    fn round_trip_within_one_unit() {
        let p = Precision::default();
        let tolerance = decode(&IBig::ONE);
        for literal in [
            "0",
            "1e-30",
            "0.3333333333333333333333333333333333333333333333333",
            "-64.999999999999999999999999999999999999999",
            "123456789.987654321",
            "1267650600228229401496703205375.5",
        ] {
            let x = p.parse(literal).unwrap();
            let back = decode(&encode(&x).unwrap());
            let err = abs(&(x - back));
            assert!(err < tolerance, "round trip of {literal} drifted by {err}");
        }
    }

    #[test]
    fn overflow_is_reported() {
        let p = Precision::default();
        // 2^128 * 2^127 = 2^255 is one past the signed maximum.
        let too_big = p.from_int(IBig::ONE << 128);
        assert!(matches!(
            encode(&too_big),
            Err(CodecError::Overflow { bits: WIRE_BITS, .. })
        ));
        let just_fits = p.from_int((IBig::ONE << 127) - IBig::ONE);
        assert!(encode(&just_fits).is_ok());
    }
}
