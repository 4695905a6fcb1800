use crate::conversion::TokenScale;
use crate::error::CoreError::{EmptyPool, PriceArithmetic};
use crate::pair_math::{quote, share_of_reserve, PairCurve, SwapOutcome};
use crate::price::{pair_boost_price, sqrt_price_to_boost_price};
use crate::util::wide::to_u64;

use anchor_lang::prelude::*;
use ethnum::U256;
use fix::prelude::*;

/// Pair state read at the start of a call, oriented to BOOST/USD.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PairSnapshot {
  pub curve: PairCurve,
  pub reserve_boost: u64,
  pub reserve_usd: u64,
  pub scale: TokenScale,
  pub lp_supply: u64,
  /// LP held by the AMO, wallet plus gauge stake.
  pub amo_liquidity: u64,
}

impl PairSnapshot {
  pub fn boost_price(&self) -> Result<UFix64<N6>> {
    pair_boost_price(
      &self.curve,
      self.reserve_boost,
      self.reserve_usd,
      self.scale,
    )
  }

  /// USD received for selling `boost_in`, fee included.
  pub fn sell_output(&self, boost_in: u64) -> Result<u64> {
    self.curve.amount_out(
      boost_in,
      self.reserve_boost,
      self.reserve_usd,
      self.scale.boost_decimals,
      self.scale.usd_decimals,
    )
  }

  /// Price once `boost_in` has been sold into the pair.
  pub fn price_after_sell(&self, boost_in: u64) -> Result<UFix64<N6>> {
    let outcome = self.curve.swap(
      boost_in,
      self.reserve_boost,
      self.reserve_usd,
      self.scale.boost_decimals,
      self.scale.usd_decimals,
    )?;
    pair_boost_price(
      &self.curve,
      outcome.reserve_in,
      outcome.reserve_out,
      self.scale,
    )
  }

  /// `(boost, usd)` paid out for burning `liquidity`.
  pub fn removal(&self, liquidity: u64) -> Result<(u64, u64)> {
    Ok((
      share_of_reserve(liquidity, self.reserve_boost, self.lp_supply)?,
      share_of_reserve(liquidity, self.reserve_usd, self.lp_supply)?,
    ))
  }

  /// Burns `liquidity` and buys BOOST with all of the USD it returned.
  /// `amount_out` is the BOOST bought, reserves are `(usd, boost)`.
  pub fn unfarm_swap(&self, liquidity: u64) -> Result<SwapOutcome> {
    let (boost_out, usd_out) = self.removal(liquidity)?;
    let reserve_boost = self.reserve_boost - boost_out;
    let reserve_usd = self.reserve_usd - usd_out;
    if reserve_boost == 0 || reserve_usd == 0 {
      return Err(EmptyPool.into());
    }
    self.curve.swap(
      usd_out,
      reserve_usd,
      reserve_boost,
      self.scale.usd_decimals,
      self.scale.boost_decimals,
    )
  }

  /// Price after burning `liquidity` and buying BOOST with all of the
  /// USD it returned.
  pub fn price_after_unfarm(&self, liquidity: u64) -> Result<UFix64<N6>> {
    let outcome = self.unfarm_swap(liquidity)?;
    pair_boost_price(
      &self.curve,
      outcome.reserve_out,
      outcome.reserve_in,
      self.scale,
    )
  }

  /// `(boost, usd)` a router deposit takes from the given budgets, the
  /// full budget on one side and the matching amount on the other.
  pub fn deposit_amounts(
    &self,
    boost_desired: u64,
    usd_desired: u64,
  ) -> Result<(u64, u64)> {
    if self.reserve_boost == 0 && self.reserve_usd == 0 {
      return Ok((boost_desired, usd_desired));
    }
    let usd_optimal = quote(boost_desired, self.reserve_boost, self.reserve_usd)?;
    if usd_optimal <= usd_desired {
      Ok((boost_desired, usd_optimal))
    } else {
      let boost_optimal =
        quote(usd_desired, self.reserve_usd, self.reserve_boost)?;
      Ok((boost_optimal, usd_desired))
    }
  }

  /// Reserves normalized to BOOST decimals.
  pub fn reserves(&self) -> Result<(u64, u64)> {
    if self.reserve_boost == 0 || self.reserve_usd == 0 {
      return Err(EmptyPool.into());
    }
    Ok((self.reserve_boost, self.scale.usd_to_boost(self.reserve_usd)?))
  }
}

/// Concentrated pool state read at the start of a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClSnapshot {
  pub sqrt_price_x64: u128,
  /// Liquidity active at the current tick.
  pub liquidity: u128,
  pub fee_rate: u32,
  pub boost_is_token0: bool,
  pub scale: TokenScale,
  pub target_sqrt_price_x64: u128,
  pub tick_lower: i32,
  pub tick_upper: i32,
  pub position_liquidity: u128,
}

impl ClSnapshot {
  pub fn boost_price(&self) -> Result<UFix64<N6>> {
    sqrt_price_to_boost_price(
      self.sqrt_price_x64,
      self.boost_is_token0,
      self.scale,
    )
  }

  pub fn target_price(&self) -> Result<UFix64<N6>> {
    sqrt_price_to_boost_price(
      self.target_sqrt_price_x64,
      self.boost_is_token0,
      self.scale,
    )
  }

  /// Virtual reserves of the active liquidity normalized to BOOST
  /// decimals.
  ///
  /// ```text
  ///   token0 = L * 2^64 / sqrtP
  ///   token1 = L * sqrtP / 2^64
  /// ```
  pub fn reserves(&self) -> Result<(u64, u64)> {
    if self.liquidity == 0 || self.sqrt_price_x64 == 0 {
      return Err(EmptyPool.into());
    }
    let liquidity = U256::new(self.liquidity);
    let sqrt = U256::new(self.sqrt_price_x64);
    let amount0 = to_u64((liquidity << 64u32) / sqrt).ok_or(PriceArithmetic)?;
    let amount1 = to_u64((liquidity * sqrt) >> 64u32).ok_or(PriceArithmetic)?;
    let (boost, usd) = if self.boost_is_token0 {
      (amount0, amount1)
    } else {
      (amount1, amount0)
    };
    Ok((boost, self.scale.usd_to_boost(usd)?))
  }
}

/// Pool state of either family, never cached across calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PoolSnapshot {
  Pair(PairSnapshot),
  Concentrated(ClSnapshot),
}

impl PoolSnapshot {
  pub fn boost_price(&self) -> Result<UFix64<N6>> {
    match self {
      PoolSnapshot::Pair(pair) => pair.boost_price(),
      PoolSnapshot::Concentrated(pool) => pool.boost_price(),
    }
  }

  /// Pairs peg at exactly one dollar, concentrated pools at the price
  /// implied by their configured target square root price.
  pub fn target_price(&self) -> Result<UFix64<N6>> {
    match self {
      PoolSnapshot::Pair(_) => Ok(UFix64::one()),
      PoolSnapshot::Concentrated(pool) => pool.target_price(),
    }
  }

  pub fn reserves(&self) -> Result<(u64, u64)> {
    match self {
      PoolSnapshot::Pair(pair) => pair.reserves(),
      PoolSnapshot::Concentrated(pool) => pool.reserves(),
    }
  }
}
