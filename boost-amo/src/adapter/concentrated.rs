use super::{AmoAccount, LiquidityFill, PoolAdapter, PositionInfo, SwapFill};

use anchor_lang::prelude::*;
use boost_core::clmm_math::{
  amounts_for_liquidity, liquidity_for_amounts, sqrt_price_at_tick,
  MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK,
};
use boost_core::error::CoreError::{
  InsufficientLiquidityMinted, InvalidSqrtPrice, InvalidTickBounds,
  SlippageExceeded,
};
use boost_core::events::AmoEvent;
use boost_core::snapshot::{ClSnapshot, PoolSnapshot};
use boost_core::venue::{ClVenue, TokenLedger};

/// `MIN_TICK <= lower < upper <= MAX_TICK`
pub fn validate_tick_bounds(tick_lower: i32, tick_upper: i32) -> Result<()> {
  if MIN_TICK <= tick_lower && tick_lower < tick_upper && tick_upper <= MAX_TICK {
    Ok(())
  } else {
    Err(InvalidTickBounds.into())
  }
}

pub fn validate_sqrt_price(sqrt_price_x64: u128) -> Result<()> {
  if MIN_SQRT_PRICE_X64 < sqrt_price_x64 && sqrt_price_x64 < MAX_SQRT_PRICE_X64 {
    Ok(())
  } else {
    Err(InvalidSqrtPrice.into())
  }
}

/// Drives one tick range of a concentrated liquidity pool. Every swap is
/// limited at the target square root price.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConcentratedAdapter {
  pub(crate) tick_lower: i32,
  pub(crate) tick_upper: i32,
  pub(crate) target_sqrt_price_x64: u128,
}

impl ConcentratedAdapter {
  pub fn new(
    tick_lower: i32,
    tick_upper: i32,
    target_sqrt_price_x64: u128,
  ) -> Result<ConcentratedAdapter> {
    validate_tick_bounds(tick_lower, tick_upper)?;
    validate_sqrt_price(target_sqrt_price_x64)?;
    Ok(ConcentratedAdapter {
      tick_lower,
      tick_upper,
      target_sqrt_price_x64,
    })
  }

  #[must_use]
  pub fn tick_bounds(&self) -> (i32, i32) {
    (self.tick_lower, self.tick_upper)
  }

  #[must_use]
  pub fn target_sqrt_price_x64(&self) -> u128 {
    self.target_sqrt_price_x64
  }

  /// Token order is read from the pool on every call.
  fn boost_is_token0<E: ClVenue>(env: &E, account: &AmoAccount) -> bool {
    env.pool_tokens().0 == account.boost
  }

  /// Reorders a `(token0, token1)` pair to `(boost, usd)`.
  fn to_boost_usd(boost_is_token0: bool, amounts: (u64, u64)) -> (u64, u64) {
    if boost_is_token0 {
      amounts
    } else {
      (amounts.1, amounts.0)
    }
  }

  /// Liquidity the budgets fund at the current price, with the
  /// `(boost, usd)` it takes.
  fn deposit<E: ClVenue>(
    &self,
    env: &E,
    account: &AmoAccount,
    boost_amount: u64,
    usd_amount: u64,
  ) -> Result<(u128, (u64, u64))> {
    let boost_is_token0 = Self::boost_is_token0(env, account);
    let (budget0, budget1) = if boost_is_token0 {
      (boost_amount, usd_amount)
    } else {
      (usd_amount, boost_amount)
    };
    let sqrt_price = env.pool_state().sqrt_price_x64;
    let sqrt_lower = sqrt_price_at_tick(self.tick_lower)?;
    let sqrt_upper = sqrt_price_at_tick(self.tick_upper)?;
    // one unit of headroom per side absorbs round-up on mint
    let liquidity = liquidity_for_amounts(
      sqrt_price,
      sqrt_lower,
      sqrt_upper,
      budget0.saturating_sub(1),
      budget1.saturating_sub(1),
    )?;
    let amounts =
      amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, liquidity, true)?;
    Ok((liquidity, Self::to_boost_usd(boost_is_token0, amounts)))
  }

  fn swap<E: ClVenue>(
    &self,
    env: &mut E,
    account: &AmoAccount,
    sell_boost: bool,
    amount_in: u64,
    min_out: u64,
  ) -> Result<(u64, u64)> {
    let boost_is_token0 = Self::boost_is_token0(env, account);
    let zero_for_one = sell_boost == boost_is_token0;
    let (spent, received) = env.pool_swap(
      &account.id,
      zero_for_one,
      amount_in,
      self.target_sqrt_price_x64,
    )?;
    if received < min_out {
      return Err(SlippageExceeded.into());
    }
    Ok((spent, received))
  }
}

impl<E: ClVenue + TokenLedger> PoolAdapter<E> for ConcentratedAdapter {
  fn snapshot(&self, env: &E, account: &AmoAccount) -> Result<PoolSnapshot> {
    let state = env.pool_state();
    let position =
      env.pool_position(&account.id, self.tick_lower, self.tick_upper);
    Ok(PoolSnapshot::Concentrated(ClSnapshot {
      sqrt_price_x64: state.sqrt_price_x64,
      liquidity: state.liquidity,
      fee_rate: state.fee_rate,
      boost_is_token0: Self::boost_is_token0(env, account),
      scale: account.scale,
      target_sqrt_price_x64: self.target_sqrt_price_x64,
      tick_lower: self.tick_lower,
      tick_upper: self.tick_upper,
      position_liquidity: position.liquidity,
    }))
  }

  fn sell_boost(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    boost_amount: u64,
    min_usd_out: u64,
    _deadline: i64,
  ) -> Result<SwapFill> {
    let (boost, usd) =
      self.swap(env, account, true, boost_amount, min_usd_out)?;
    Ok(SwapFill { boost, usd })
  }

  fn buy_boost(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    usd_amount: u64,
    min_boost_out: u64,
    _deadline: i64,
  ) -> Result<SwapFill> {
    let (usd, boost) =
      self.swap(env, account, false, usd_amount, min_boost_out)?;
    Ok(SwapFill { boost, usd })
  }

  fn add_liquidity(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    boost_amount: u64,
    usd_amount: u64,
    min_boost_spent: u64,
    min_usd_spent: u64,
    _deadline: i64,
  ) -> Result<LiquidityFill> {
    let boost_is_token0 = Self::boost_is_token0(env, account);
    let (liquidity, _) = self.deposit(env, account, boost_amount, usd_amount)?;
    if liquidity == 0 {
      return Err(InsufficientLiquidityMinted.into());
    }
    let spent = env.pool_mint(
      &account.id,
      self.tick_lower,
      self.tick_upper,
      liquidity,
    )?;
    let (boost, usd) = Self::to_boost_usd(boost_is_token0, spent);
    if boost < min_boost_spent || usd < min_usd_spent {
      return Err(SlippageExceeded.into());
    }
    Ok(LiquidityFill {
      boost,
      usd,
      liquidity,
    })
  }

  fn quote_add_liquidity(
    &self,
    env: &E,
    account: &AmoAccount,
    boost_amount: u64,
    usd_amount: u64,
  ) -> Result<(u64, u64)> {
    let (_, spent) = self.deposit(env, account, boost_amount, usd_amount)?;
    Ok(spent)
  }

  fn remove_liquidity(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    liquidity: u128,
    min_boost_removed: u64,
    min_usd_removed: u64,
    _deadline: i64,
  ) -> Result<LiquidityFill> {
    let boost_is_token0 = Self::boost_is_token0(env, account);
    let burned =
      env.pool_burn(&account.id, self.tick_lower, self.tick_upper, liquidity)?;
    let (boost, usd) = Self::to_boost_usd(boost_is_token0, burned);
    if boost < min_boost_removed || usd < min_usd_removed {
      return Err(SlippageExceeded.into());
    }
    let collected = env.pool_collect(
      &account.id,
      self.tick_lower,
      self.tick_upper,
      u64::MAX,
      u64::MAX,
    )?;
    let (boost, usd) = Self::to_boost_usd(boost_is_token0, collected);
    Ok(LiquidityFill {
      boost,
      usd,
      liquidity,
    })
  }

  fn position(&self, env: &E, account: &AmoAccount) -> Result<PositionInfo> {
    let position =
      env.pool_position(&account.id, self.tick_lower, self.tick_upper);
    let amounts = amounts_for_liquidity(
      env.pool_state().sqrt_price_x64,
      sqrt_price_at_tick(self.tick_lower)?,
      sqrt_price_at_tick(self.tick_upper)?,
      position.liquidity,
      false,
    )?;
    let (boost, usd) =
      Self::to_boost_usd(Self::boost_is_token0(env, account), amounts);
    let (owed_boost, owed_usd) = Self::to_boost_usd(
      Self::boost_is_token0(env, account),
      (position.tokens_owed_0, position.tokens_owed_1),
    );
    Ok(PositionInfo {
      liquidity: position.liquidity,
      boost: boost.saturating_add(owed_boost),
      usd: usd.saturating_add(owed_usd),
    })
  }

  fn liquidity_event(&self, fill: &LiquidityFill) -> Result<AmoEvent> {
    Ok(AmoEvent::AddLiquidity {
      boost_spent: fill.boost,
      usd_spent: fill.usd,
      liquidity: fill.liquidity,
    })
  }
}
