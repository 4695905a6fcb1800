use crate::error::CoreError::DecimalConversion;

use anchor_lang::prelude::*;

/// `10^exp` for token decimal scaling.
#[must_use]
pub fn pow10(exp: u8) -> Option<u128> {
  10u128.checked_pow(u32::from(exp))
}

/// Decimal precision of the two tokens an AMO trades, with peg-rate
/// conversions between their raw base units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TokenScale {
  pub boost_decimals: u8,
  pub usd_decimals: u8,
}

impl TokenScale {
  #[must_use]
  pub fn new(boost_decimals: u8, usd_decimals: u8) -> TokenScale {
    TokenScale {
      boost_decimals,
      usd_decimals,
    }
  }

  fn rescale(amount: u64, from: u8, to: u8) -> Option<u64> {
    let scaled = u128::from(amount).checked_mul(pow10(to)?)? / pow10(from)?;
    u64::try_from(scaled).ok()
  }

  /// BOOST base units worth `amount` USD base units at peg, rounded down.
  ///   `USD * 10^boost_decimals / 10^usd_decimals`
  pub fn usd_to_boost(&self, amount: u64) -> Result<u64> {
    Self::rescale(amount, self.usd_decimals, self.boost_decimals)
      .ok_or(DecimalConversion.into())
  }

  /// USD base units worth `amount` BOOST base units at peg, rounded down.
  pub fn boost_to_usd(&self, amount: u64) -> Result<u64> {
    Self::rescale(amount, self.boost_decimals, self.usd_decimals)
      .ok_or(DecimalConversion.into())
  }

  /// Selling `boost_in` for `usd_out` realised at least peg value.
  pub fn sold_at_or_above_peg(&self, boost_in: u64, usd_out: u64) -> Result<bool> {
    let value_out = u128::from(usd_out)
      .checked_mul(pow10(self.boost_decimals).ok_or(DecimalConversion)?)
      .ok_or(DecimalConversion)?;
    let value_in = u128::from(boost_in)
      .checked_mul(pow10(self.usd_decimals).ok_or(DecimalConversion)?)
      .ok_or(DecimalConversion)?;
    Ok(value_out >= value_in)
  }

  /// Buying `boost_out` with `usd_in` paid at most peg value.
  pub fn bought_at_or_below_peg(
    &self,
    usd_in: u64,
    boost_out: u64,
  ) -> Result<bool> {
    let value_out = u128::from(boost_out)
      .checked_mul(pow10(self.usd_decimals).ok_or(DecimalConversion)?)
      .ok_or(DecimalConversion)?;
    let value_in = u128::from(usd_in)
      .checked_mul(pow10(self.boost_decimals).ok_or(DecimalConversion)?)
      .ok_or(DecimalConversion)?;
    Ok(value_out >= value_in)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  const SCALE: TokenScale = TokenScale {
    boost_decimals: 9,
    usd_decimals: 6,
  };

  #[test]
  fn usd_to_boost_scales_up() -> Result<()> {
    assert_eq!(SCALE.usd_to_boost(1_500_000)?, 1_500_000_000);
    Ok(())
  }

  #[test]
  fn boost_to_usd_truncates() -> Result<()> {
    assert_eq!(SCALE.boost_to_usd(1_999)?, 1);
    Ok(())
  }

  #[test]
  fn usd_to_boost_overflow() {
    let scale = TokenScale::new(18, 6);
    let out = scale.usd_to_boost(u64::MAX);
    assert_eq!(out, Err(DecimalConversion.into()));
  }

  #[test]
  fn peg_checks() -> Result<()> {
    assert!(SCALE.sold_at_or_above_peg(1_000_000_000, 1_000_000)?);
    assert!(!SCALE.sold_at_or_above_peg(1_000_000_001, 1_000_000)?);
    assert!(SCALE.bought_at_or_below_peg(1_000_000, 1_000_000_000)?);
    assert!(!SCALE.bought_at_or_below_peg(1_000_001, 1_000_000_000)?);
    Ok(())
  }

  proptest! {
    #[test]
    fn round_trip_never_inflates(amount in 0u64..u64::MAX / 1_000) {
      let there = SCALE.usd_to_boost(amount).unwrap();
      let back = SCALE.boost_to_usd(there).unwrap();
      prop_assert_eq!(back, amount);
      let down = SCALE.boost_to_usd(amount).unwrap();
      prop_assert!(SCALE.usd_to_boost(down).unwrap() <= amount);
    }
  }
}
