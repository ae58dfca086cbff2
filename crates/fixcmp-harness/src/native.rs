//! In-process candidates evaluated with IEEE-754 `f64` arithmetic.
//!
//! These stand in for deployed routines so the batch binary runs end to end.
//! Costs come from a fixed model: the base call cost, a per-routine execution
//! cost, and a per-argument charge proportional to its decimal length.

use async_trait::async_trait;
use dashu::integer::IBig;
use fixcmp_core::{Precision, codec, real::to_f64};

use crate::invoker::{BASE_CALL_COST, ContractInvoker, InvokeError};

/// Charge per 32-byte argument word.
const WORD_COST: u64 = 68;
/// Charge per decimal digit of an argument.
const DIGIT_COST: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeRoutine {
    /// `exp(x)` on a fixed-point argument.
    Exp,
    /// `ln(x)` on a fixed-point argument.
    Ln,
    /// Reward split with two `powf` calls.
    RewardPowf,
    /// Reward split as `exp(alpha * ln(f) + (1 - alpha) * ln(s))`.
    RewardExpLn,
}

impl NativeRoutine {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exp => "native-exp",
            Self::Ln => "native-ln",
            Self::RewardPowf => "native-powf",
            Self::RewardExpLn => "native-exp-ln",
        }
    }

    const fn arity(self) -> usize {
        match self {
            Self::Exp | Self::Ln => 1,
            Self::RewardPowf | Self::RewardExpLn => 5,
        }
    }

    const fn execution_cost(self) -> u64 {
        match self {
            Self::Exp => 2_600,
            Self::Ln => 3_400,
            Self::RewardPowf => 9_800,
            Self::RewardExpLn => 7_200,
        }
    }
}

/// A [`ContractInvoker`] backed by a [`NativeRoutine`].
#[derive(Debug, Clone)]
pub struct NativeInvoker {
    routine: NativeRoutine,
    precision: Precision,
}

impl NativeInvoker {
    #[must_use]
    pub fn new(routine: NativeRoutine, precision: Precision) -> Self {
        Self { routine, precision }
    }

    #[must_use]
    pub fn routine(&self) -> NativeRoutine {
        self.routine
    }

    fn reject(&self, reason: impl Into<String>) -> InvokeError {
        InvokeError::Rejected {
            candidate: self.routine.name().to_string(),
            reason: reason.into(),
        }
    }

    fn check_arity(&self, args: &[String]) -> Result<(), InvokeError> {
        if args.len() == self.routine.arity() {
            Ok(())
        } else {
            Err(self.reject(format!(
                "expected {} arguments, got {}",
                self.routine.arity(),
                args.len()
            )))
        }
    }

    fn fixed_arg(&self, raw: &str) -> Result<f64, InvokeError> {
        let n = raw
            .parse::<IBig>()
            .map_err(|_| self.reject(format!("argument `{raw}` is not an integer")))?;
        Ok(to_f64(&codec::decode(&n)))
    }

    fn int_arg(&self, raw: &str) -> Result<f64, InvokeError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.reject(format!("argument `{raw}` is not an unsigned integer")));
        }
        raw.parse::<f64>()
            .map_err(|_| self.reject(format!("argument `{raw}` is not an unsigned integer")))
    }

    fn to_fixed(&self, value: f64) -> Result<String, InvokeError> {
        if !value.is_finite() {
            return Err(self.reject("non-finite result"));
        }
        let real = self
            .precision
            .parse(&format!("{value:e}"))
            .map_err(|e| self.reject(e.to_string()))?;
        codec::encode(&real)
            .map(|n| n.to_string())
            .map_err(|e| self.reject(e.to_string()))
    }

    fn reward(&self, args: &[String]) -> Result<String, InvokeError> {
        let [rewards, owner_fees, total_fees, owner_stake, total_stake] = [
            self.int_arg(&args[0])?,
            self.int_arg(&args[1])?,
            self.int_arg(&args[2])?,
            self.int_arg(&args[3])?,
            self.int_arg(&args[4])?,
        ];
        if total_fees == 0.0 || total_stake == 0.0 {
            return Err(self.reject("division by zero"));
        }
        let (fee_ratio, stake_ratio) = (owner_fees / total_fees, owner_stake / total_stake);
        let alpha = 1.0 / 6.0;
        let weight = match self.routine {
            NativeRoutine::RewardPowf => fee_ratio.powf(alpha) * stake_ratio.powf(1.0 - alpha),
            _ if fee_ratio == 0.0 || stake_ratio == 0.0 => 0.0,
            _ => (alpha * fee_ratio.ln() + (1.0 - alpha) * stake_ratio.ln()).exp(),
        };
        let result = (rewards * weight).round();
        if !result.is_finite() {
            return Err(self.reject("non-finite result"));
        }
        Ok(format!("{result:.0}"))
    }
}

#[async_trait]
impl ContractInvoker for NativeInvoker {
    fn name(&self) -> &str {
        self.routine.name()
    }

    async fn evaluate(&self, args: &[String]) -> Result<String, InvokeError> {
        self.check_arity(args)?;
        match self.routine {
            NativeRoutine::Exp => self.to_fixed(self.fixed_arg(&args[0])?.exp()),
            NativeRoutine::Ln => {
                let x = self.fixed_arg(&args[0])?;
                if x <= 0.0 {
                    return Err(self.reject("logarithm of a non-positive value"));
                }
                self.to_fixed(x.ln())
            }
            NativeRoutine::RewardPowf | NativeRoutine::RewardExpLn => self.reward(args),
        }
    }

    async fn estimate_cost(&self, args: &[String]) -> Result<u64, InvokeError> {
        self.check_arity(args)?;
        let calldata: u64 = args
            .iter()
            .map(|a| WORD_COST + DIGIT_COST * a.trim_start_matches('-').len() as u64)
            .sum();
        Ok(BASE_CALL_COST + self.routine.execution_cost() + calldata)
    }
}
