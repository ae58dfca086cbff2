//! Reward-split parameter records.

use dashu::base::BitTest;
use dashu::integer::UBig;

use crate::error::DomainError;

/// Upper bound (inclusive) for sampled reward, fee and stake totals: `10^27`.
#[must_use]
pub fn default_total_bound() -> UBig {
    UBig::from(10u8).pow(27)
}

const MAX_BITS: usize = 256;

/// Inputs of one reward-split case.
///
/// Fields are private so a `Parameters` value always satisfies:
/// `total_fees >= 1`, `total_stake >= 1`, `owner_fees <= total_fees`,
/// `owner_stake <= total_stake`, and every field fits in 256 bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameters {
    total_rewards: UBig,
    total_fees: UBig,
    owner_fees: UBig,
    total_stake: UBig,
    owner_stake: UBig,
}

impl Parameters {
    pub fn new(
        total_rewards: UBig,
        total_fees: UBig,
        owner_fees: UBig,
        total_stake: UBig,
        owner_stake: UBig,
    ) -> Result<Self, DomainError> {
        for (field, value) in [
            ("total_rewards", &total_rewards),
            ("total_fees", &total_fees),
            ("owner_fees", &owner_fees),
            ("total_stake", &total_stake),
            ("owner_stake", &owner_stake),
        ] {
            if value.bit_len() > MAX_BITS {
                return Err(DomainError::OutOfRange { field });
            }
        }
        if total_fees == UBig::ZERO {
            return Err(DomainError::ZeroDenominator {
                field: "total_fees",
            });
        }
        if total_stake == UBig::ZERO {
            return Err(DomainError::ZeroDenominator {
                field: "total_stake",
            });
        }
        if owner_fees > total_fees {
            return Err(DomainError::PortionExceedsTotal {
                part: "owner_fees",
                whole: "total_fees",
            });
        }
        if owner_stake > total_stake {
            return Err(DomainError::PortionExceedsTotal {
                part: "owner_stake",
                whole: "total_stake",
            });
        }
        Ok(Self {
            total_rewards,
            total_fees,
            owner_fees,
            total_stake,
            owner_stake,
        })
    }

    #[must_use]
    pub fn total_rewards(&self) -> &UBig {
        &self.total_rewards
    }

    #[must_use]
    pub fn total_fees(&self) -> &UBig {
        &self.total_fees
    }

    #[must_use]
    pub fn owner_fees(&self) -> &UBig {
        &self.owner_fees
    }

    #[must_use]
    pub fn total_stake(&self) -> &UBig {
        &self.total_stake
    }

    #[must_use]
    pub fn owner_stake(&self) -> &UBig {
        &self.owner_stake
    }

    /// Arguments in candidate call order:
    /// `(total_rewards, owner_fees, total_fees, owner_stake, total_stake)`.
    #[must_use]
    pub fn call_order(&self) -> [&UBig; 5] {
        [
            &self.total_rewards,
            &self.owner_fees,
            &self.total_fees,
            &self.owner_stake,
            &self.total_stake,
        ]
    }
}

impl std::fmt::Display for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rewards={} fees={}/{} stake={}/{}",
            self.total_rewards, self.owner_fees, self.total_fees, self.owner_stake, self.total_stake
        )
    }
}

/// Pins some parameter fields; the rest are sampled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOverrides {
    pub total_rewards: Option<UBig>,
    pub total_fees: Option<UBig>,
    pub owner_fees: Option<UBig>,
    pub total_stake: Option<UBig>,
    pub owner_stake: Option<UBig>,
}

impl ParameterOverrides {
    #[must_use]
    pub fn with_total_rewards(mut self, value: UBig) -> Self {
        self.total_rewards = Some(value);
        self
    }

    #[must_use]
    pub fn with_fees(mut self, owner: UBig, total: UBig) -> Self {
        self.owner_fees = Some(owner);
        self.total_fees = Some(total);
        self
    }

    #[must_use]
    pub fn with_stake(mut self, owner: UBig, total: UBig) -> Self {
        self.owner_stake = Some(owner);
        self.total_stake = Some(total);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> UBig {
        UBig::from(v)
    }

    #[test]
    fn accepts_valid_record() {
        let p = Parameters::new(u(1_000_000), u(100), u(50), u(100), u(50)).unwrap();
        assert_eq!(p.owner_fees(), &u(50));
        assert_eq!(p.call_order()[2], &u(100));
    }

    #[test]
    fn rejects_zero_denominators() {
        assert_eq!(
            Parameters::new(u(1), u(0), u(0), u(1), u(0)),
            Err(DomainError::ZeroDenominator {
                field: "total_fees"
            })
        );
        assert_eq!(
            Parameters::new(u(1), u(1), u(0), u(0), u(0)),
            Err(DomainError::ZeroDenominator {
                field: "total_stake"
            })
        );
    }

    #[test]
    fn rejects_portion_above_total() {
        assert!(matches!(
            Parameters::new(u(1), u(10), u(11), u(1), u(0)),
            Err(DomainError::PortionExceedsTotal {
                part: "owner_fees",
                ..
            })
        ));
        assert!(matches!(
            Parameters::new(u(1), u(10), u(10), u(5), u(6)),
            Err(DomainError::PortionExceedsTotal {
                part: "owner_stake",
                ..
            })
        ));
    }

    #[test]
    fn rejects_values_wider_than_256_bits() {
        let wide = UBig::ONE << 256;
        assert_eq!(
            Parameters::new(wide, u(1), u(0), u(1), u(0)),
            Err(DomainError::OutOfRange {
                field: "total_rewards"
            })
        );
    }
}
