use crate::ratio::{validate_ratio, RatioBound};

use anchor_lang::prelude::*;
use fix::prelude::*;
use serde::{Deserialize, Serialize};

/// Tunable knobs of one AMO instance.
///
/// Multipliers (`>= 1.0`) widen a computed correction, fractions
/// (`<= 1.0`) throttle how much of it public callers may deploy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PegParameters {
  /// Widens the sell search bound and the BOOST paired with USD on adds.
  pub boost_multiplier: UFix64<N6>,
  /// Relative dead-band half-width around the target price.
  pub valid_range_width: UFix64<N6>,
  /// Ceiling on liquidity removed relative to the computed requirement.
  pub valid_removing_ratio: UFix64<N6>,
  /// Public unfarm-buy-burn only at or below this price.
  pub boost_lower_price_sell: UFix64<N6>,
  /// Public mint-sell-farm only at or above this price.
  pub boost_upper_price_buy: UFix64<N6>,
  pub boost_sell_ratio: UFix64<N6>,
  pub usd_buy_ratio: UFix64<N6>,
  pub usd_usage_ratio: UFix64<N6>,
}

impl Default for PegParameters {
  fn default() -> Self {
    PegParameters {
      boost_multiplier: UFix64::new(1_100_000),
      valid_range_width: UFix64::new(10_000),
      valid_removing_ratio: UFix64::new(1_010_000),
      boost_lower_price_sell: UFix64::new(990_000),
      boost_upper_price_buy: UFix64::new(1_010_000),
      boost_sell_ratio: UFix64::new(800_000),
      usd_buy_ratio: UFix64::new(800_000),
      usd_usage_ratio: UFix64::new(950_000),
    }
  }
}

impl PegParameters {
  /// Builds a parameter set, rejecting any out of bound ratio.
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    boost_multiplier: UFix64<N6>,
    valid_range_width: UFix64<N6>,
    valid_removing_ratio: UFix64<N6>,
    boost_lower_price_sell: UFix64<N6>,
    boost_upper_price_buy: UFix64<N6>,
    boost_sell_ratio: UFix64<N6>,
    usd_buy_ratio: UFix64<N6>,
    usd_usage_ratio: UFix64<N6>,
  ) -> Result<PegParameters> {
    let params = PegParameters {
      boost_multiplier,
      valid_range_width,
      valid_removing_ratio,
      boost_lower_price_sell,
      boost_upper_price_buy,
      boost_sell_ratio,
      usd_buy_ratio,
      usd_usage_ratio,
    };
    params.validate()?;
    Ok(params)
  }

  /// Ensures every field sits on the correct side of `1.0`:
  ///   - multipliers: boost multiplier, removing ratio, upper buy price
  ///   - fractions: range width, lower sell price, the three usage ratios
  pub fn validate(&self) -> Result<()> {
    let multiplier = RatioBound::multiplier();
    let fraction = RatioBound::fraction();
    validate_ratio(self.boost_multiplier, multiplier)?;
    validate_ratio(self.valid_range_width, fraction)?;
    validate_ratio(self.valid_removing_ratio, multiplier)?;
    validate_ratio(self.boost_lower_price_sell, fraction)?;
    validate_ratio(self.boost_upper_price_buy, multiplier)?;
    validate_ratio(self.boost_sell_ratio, fraction)?;
    validate_ratio(self.usd_buy_ratio, fraction)?;
    validate_ratio(self.usd_usage_ratio, fraction)
  }
}

/// Raw `1e6` bits form of [`PegParameters`], used for config files and
/// emitted events.
#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AnchorSerialize,
  AnchorDeserialize,
)]
pub struct ParamsConfig {
  pub boost_multiplier: u64,
  pub valid_range_width: u64,
  pub valid_removing_ratio: u64,
  pub boost_lower_price_sell: u64,
  pub boost_upper_price_buy: u64,
  pub boost_sell_ratio: u64,
  pub usd_buy_ratio: u64,
  pub usd_usage_ratio: u64,
}

impl From<&PegParameters> for ParamsConfig {
  fn from(params: &PegParameters) -> Self {
    ParamsConfig {
      boost_multiplier: params.boost_multiplier.bits,
      valid_range_width: params.valid_range_width.bits,
      valid_removing_ratio: params.valid_removing_ratio.bits,
      boost_lower_price_sell: params.boost_lower_price_sell.bits,
      boost_upper_price_buy: params.boost_upper_price_buy.bits,
      boost_sell_ratio: params.boost_sell_ratio.bits,
      usd_buy_ratio: params.usd_buy_ratio.bits,
      usd_usage_ratio: params.usd_usage_ratio.bits,
    }
  }
}

impl Default for ParamsConfig {
  fn default() -> Self {
    ParamsConfig::from(&PegParameters::default())
  }
}

impl TryFrom<ParamsConfig> for PegParameters {
  type Error = anchor_lang::error::Error;

  fn try_from(config: ParamsConfig) -> Result<Self> {
    PegParameters::new(
      UFix64::new(config.boost_multiplier),
      UFix64::new(config.valid_range_width),
      UFix64::new(config.valid_removing_ratio),
      UFix64::new(config.boost_lower_price_sell),
      UFix64::new(config.boost_upper_price_buy),
      UFix64::new(config.boost_sell_ratio),
      UFix64::new(config.usd_buy_ratio),
      UFix64::new(config.usd_usage_ratio),
    )
  }
}
