use crate::error::CoreError::SlippageArithmetic;

use anchor_lang::prelude::*;
use fix::prelude::*;

/// Expected token amount paired with the tolerated relative shortfall.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlippageConfig {
  pub expected_token_out: u64,
  pub slippage_tolerance: UFix64<N4>,
}

impl SlippageConfig {
  #[must_use]
  pub fn new(
    expected_token_out: u64,
    slippage_tolerance: UFix64<N4>,
  ) -> SlippageConfig {
    SlippageConfig {
      expected_token_out,
      slippage_tolerance,
    }
  }

  /// Lowest tolerable amount, `expected * (1 - tolerance)` rounded down.
  pub fn min_token_out(&self) -> Result<u64> {
    // Invert slippage and multiply with expected amount
    let factor = UFix64::<N4>::one()
      .checked_sub(&self.slippage_tolerance)
      .ok_or(SlippageArithmetic)?;
    let tolerable = u128::from(self.expected_token_out)
      * u128::from(factor.bits)
      / u128::from(UFix64::<N4>::one().bits);
    u64::try_from(tolerable).map_err(|_| SlippageArithmetic.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fifty_bps_below_expected() -> Result<()> {
    let config = SlippageConfig::new(2_000_000, UFix64::new(50));
    assert_eq!(config.min_token_out()?, 1_990_000);
    Ok(())
  }

  #[test]
  fn zero_tolerance_keeps_expected() -> Result<()> {
    let config = SlippageConfig::new(99_411_501, UFix64::zero());
    assert_eq!(config.min_token_out()?, 99_411_501);
    Ok(())
  }

  #[test]
  fn min_out_rounds_down() -> Result<()> {
    let config = SlippageConfig::new(10_001, UFix64::new(10));
    assert_eq!(config.min_token_out()?, 9_990);
    Ok(())
  }

  #[test]
  fn tolerance_above_one_errors() {
    let config = SlippageConfig::new(100, UFix64::new(10_001));
    let out = config.min_token_out();
    assert_eq!(out, Err(SlippageArithmetic.into()));
  }
}
