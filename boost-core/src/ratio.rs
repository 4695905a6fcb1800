use crate::error::CoreError::InvalidRatioValue;

use anchor_lang::prelude::*;
use fix::prelude::*;

/// Unit of every ratio and price, `1e6` bits is exactly 1.0.
pub const FACTOR: UFix64<N6> = UFix64::constant(1_000_000);

/// Which side of [`FACTOR`] a ratio is allowed to sit on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RatioBound {
  /// Fraction semantics, value must not exceed the threshold.
  AtMost(UFix64<N6>),
  /// Multiplier semantics, value must not go below the threshold.
  AtLeast(UFix64<N6>),
}

impl RatioBound {
  #[must_use]
  pub fn fraction() -> RatioBound {
    RatioBound::AtMost(FACTOR)
  }

  #[must_use]
  pub fn multiplier() -> RatioBound {
    RatioBound::AtLeast(FACTOR)
  }

  #[must_use]
  pub fn admits(&self, value: UFix64<N6>) -> bool {
    match *self {
      RatioBound::AtMost(threshold) => value <= threshold,
      RatioBound::AtLeast(threshold) => value >= threshold,
    }
  }
}

/// Rejects a ratio falling on the wrong side of its bound.
pub fn validate_ratio(value: UFix64<N6>, bound: RatioBound) -> Result<()> {
  if bound.admits(value) {
    Ok(())
  } else {
    Err(InvalidRatioValue.into())
  }
}

/// Scales a raw token amount by a ratio, rounding down.
///
/// ```text
///   amount * ratio
///   ──────────────
///       FACTOR
/// ```
#[must_use]
pub fn apply_ratio_floor(amount: u64, ratio: UFix64<N6>) -> Option<u64> {
  let scaled = u128::from(amount).checked_mul(u128::from(ratio.bits))?
    / u128::from(FACTOR.bits);
  u64::try_from(scaled).ok()
}

/// Same as [`apply_ratio_floor`] for concentrated liquidity amounts.
#[must_use]
pub fn apply_ratio_floor_u128(amount: u128, ratio: UFix64<N6>) -> Option<u128> {
  amount
    .checked_mul(u128::from(ratio.bits))
    .map(|scaled| scaled / u128::from(FACTOR.bits))
}
