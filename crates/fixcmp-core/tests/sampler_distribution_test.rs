//! Integration test: sampler distribution and codec round trip.
//!
//! Validates that:
//! 1. `random_integer` stays in range and is close to uniform (chi-square).
//! 2. `random_portion` never exceeds its total over large totals.
//! 3. `decode(encode(x))` recovers sampled reals within one fixed-point unit.
//!
//! Run: cargo test -p fixcmp-core --test sampler_distribution_test

use dashu::integer::{IBig, UBig};
use fixcmp_core::codec::{decode, encode};
use fixcmp_core::real::abs;
use fixcmp_core::{Precision, RandomSampler};

const BUCKETS: usize = 10;
const DRAWS: usize = 20_000;

// Chi-square critical value for 9 degrees of freedom at p = 0.001.
const CHI_SQUARE_CRITICAL_DF9: f64 = 27.877;

#[test]
fn random_integer_is_approximately_uniform() {
    let mut sampler = RandomSampler::seeded(0xDEAD_BEEF, Precision::default());
    let (min, max) = (IBig::from(0), IBig::from(BUCKETS as i64 - 1));
    let mut counts = [0usize; BUCKETS];
    for _ in 0..DRAWS {
        let v = sampler.random_integer(&min, &max).unwrap();
        assert!(v >= min && v <= max);
        counts[usize::try_from(v).unwrap()] += 1;
    }

    let expected = DRAWS as f64 / BUCKETS as f64;
    let chi_square: f64 = counts
        .iter()
        .map(|&observed| {
            let d = observed as f64 - expected;
            d * d / expected
        })
        .sum();
    assert!(
        chi_square < CHI_SQUARE_CRITICAL_DF9,
        "chi-square {chi_square:.3} over {counts:?}"
    );
}

#[test]
fn random_integer_covers_wide_offset_range() {
    let mut sampler = RandomSampler::seeded(17, Precision::default());
    let min = IBig::from(10u8).pow(27);
    let max = &min + IBig::from(3u8);
    for _ in 0..500 {
        let v = sampler.random_integer(&min, &max).unwrap();
        assert!(v >= min && v <= max);
    }
}

#[test]
fn random_portion_never_exceeds_large_total() {
    let mut sampler = RandomSampler::seeded(99, Precision::default());
    let total = (UBig::ONE << 255) + UBig::from(12_345u32);
    for _ in 0..1_000 {
        assert!(sampler.random_portion(&total) <= total);
    }
}

#[test]
fn codec_round_trip_over_sampled_reals() {
    let precision = Precision::default();
    let mut sampler = RandomSampler::seeded(2024, precision);
    let unit = decode(&IBig::ONE);
    let ranges = [("-65", "0"), ("0", "1"), ("-1e30", "1e30")];
    for (lo, hi) in ranges {
        let (lo, hi) = (precision.parse(lo).unwrap(), precision.parse(hi).unwrap());
        for _ in 0..200 {
            let x = sampler.random_float(&lo, &hi).unwrap();
            let back = decode(&encode(&x).unwrap());
            assert!(abs(&(x.clone() - back)) < unit, "round trip drifted for {x}");
        }
    }
}
