use crate::error::SimError::{
  InsufficientPositionLiquidity, InvalidPriceLimit, InvalidTickRange,
  InvalidToken, PoolArithmetic, ZeroLiquidity,
};
use crate::ledger::Ledger;

use anchor_lang::prelude::*;
use boost_core::clmm_math::{
  amounts_for_liquidity, compute_swap_step, sqrt_price_at_tick,
  tick_at_sqrt_price, MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64,
  MIN_TICK,
};
use boost_core::venue::{ClPoolState, ClPosition, TokenLedger};
use tracing::debug;

use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct TickInfo {
  liquidity_gross: u128,
  liquidity_net: i128,
}

/// Concentrated liquidity pool over Q64.64 square root prices. Only
/// initialized ticks are stored; swaps walk them in price order.
#[derive(Clone, Debug)]
pub struct ConcentratedPool {
  pub address: Pubkey,
  pub token0: Pubkey,
  pub token1: Pubkey,
  fee_rate: u32,
  sqrt_price_x64: u128,
  tick: i32,
  liquidity: u128,
  ticks: BTreeMap<i32, TickInfo>,
  positions: BTreeMap<(Pubkey, i32, i32), ClPosition>,
  fees: (u64, u64),
}

impl ConcentratedPool {
  /// Pool of two tokens sorted by address, opened at `sqrt_price_x64`.
  pub fn new(
    token_a: Pubkey,
    token_b: Pubkey,
    fee_rate: u32,
    sqrt_price_x64: u128,
  ) -> Result<ConcentratedPool> {
    if token_a == token_b {
      return Err(InvalidToken.into());
    }
    let (token0, token1) = if token_a < token_b {
      (token_a, token_b)
    } else {
      (token_b, token_a)
    };
    Ok(ConcentratedPool {
      address: Pubkey::new_unique(),
      token0,
      token1,
      fee_rate,
      sqrt_price_x64,
      tick: tick_at_sqrt_price(sqrt_price_x64)?,
      liquidity: 0,
      ticks: BTreeMap::new(),
      positions: BTreeMap::new(),
      fees: (0, 0),
    })
  }

  #[must_use]
  pub fn state(&self) -> ClPoolState {
    ClPoolState {
      sqrt_price_x64: self.sqrt_price_x64,
      tick: self.tick,
      liquidity: self.liquidity,
      fee_rate: self.fee_rate,
    }
  }

  /// Swap fees retained by the pool as `(token0, token1)`.
  #[must_use]
  pub fn fees(&self) -> (u64, u64) {
    self.fees
  }

  #[must_use]
  pub fn position(&self, owner: &Pubkey, tick_lower: i32, tick_upper: i32) -> ClPosition {
    self
      .positions
      .get(&(*owner, tick_lower, tick_upper))
      .copied()
      .unwrap_or_default()
  }

  fn validate_range(tick_lower: i32, tick_upper: i32) -> Result<()> {
    if tick_lower < tick_upper && tick_lower >= MIN_TICK && tick_upper <= MAX_TICK {
      Ok(())
    } else {
      Err(InvalidTickRange.into())
    }
  }

  fn in_range(&self, tick_lower: i32, tick_upper: i32) -> bool {
    tick_lower <= self.tick && self.tick < tick_upper
  }

  fn update_tick(&mut self, tick: i32, delta: i128, upper: bool) -> Result<()> {
    let info = self.ticks.entry(tick).or_default();
    info.liquidity_gross = info
      .liquidity_gross
      .checked_add_signed(delta)
      .ok_or(PoolArithmetic)?;
    info.liquidity_net = if upper {
      info.liquidity_net.checked_sub(delta)
    } else {
      info.liquidity_net.checked_add(delta)
    }
    .ok_or(PoolArithmetic)?;
    if info.liquidity_gross == 0 {
      self.ticks.remove(&tick);
    }
    Ok(())
  }

  fn modify_position(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    delta: i128,
  ) -> Result<()> {
    self.update_tick(tick_lower, delta, false)?;
    self.update_tick(tick_upper, delta, true)?;
    if self.in_range(tick_lower, tick_upper) {
      self.liquidity = self
        .liquidity
        .checked_add_signed(delta)
        .ok_or(PoolArithmetic)?;
    }
    let position = self
      .positions
      .entry((*owner, tick_lower, tick_upper))
      .or_default();
    position.liquidity = position
      .liquidity
      .checked_add_signed(delta)
      .ok_or(InsufficientPositionLiquidity)?;
    Ok(())
  }

  fn amounts(
    &self,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    round_up: bool,
  ) -> Result<(u64, u64)> {
    amounts_for_liquidity(
      self.sqrt_price_x64,
      sqrt_price_at_tick(tick_lower)?,
      sqrt_price_at_tick(tick_upper)?,
      liquidity,
      round_up,
    )
  }

  /// Adds `liquidity` to a range, pulling the owed tokens from `owner`.
  pub fn mint(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
  ) -> Result<(u64, u64)> {
    Self::validate_range(tick_lower, tick_upper)?;
    if liquidity == 0 {
      return Err(ZeroLiquidity.into());
    }
    let delta = i128::try_from(liquidity).map_err(|_| PoolArithmetic)?;
    let (amount0, amount1) = self.amounts(tick_lower, tick_upper, liquidity, true)?;
    ledger.transfer(&self.token0, owner, &self.address, amount0)?;
    ledger.transfer(&self.token1, owner, &self.address, amount1)?;
    self.modify_position(owner, tick_lower, tick_upper, delta)?;
    debug!(tick_lower, tick_upper, %liquidity, amount0, amount1, "position mint");
    Ok((amount0, amount1))
  }

  /// Removes `liquidity` from a range. Tokens stay in the pool as owed
  /// until collected.
  pub fn burn(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
  ) -> Result<(u64, u64)> {
    Self::validate_range(tick_lower, tick_upper)?;
    if liquidity == 0 {
      return Err(ZeroLiquidity.into());
    }
    if self.position(owner, tick_lower, tick_upper).liquidity < liquidity {
      return Err(InsufficientPositionLiquidity.into());
    }
    let delta = i128::try_from(liquidity).map_err(|_| PoolArithmetic)?;
    let (amount0, amount1) = self.amounts(tick_lower, tick_upper, liquidity, false)?;
    self.modify_position(owner, tick_lower, tick_upper, -delta)?;
    let position = self
      .positions
      .entry((*owner, tick_lower, tick_upper))
      .or_default();
    position.tokens_owed_0 = position
      .tokens_owed_0
      .checked_add(amount0)
      .ok_or(PoolArithmetic)?;
    position.tokens_owed_1 = position
      .tokens_owed_1
      .checked_add(amount1)
      .ok_or(PoolArithmetic)?;
    debug!(tick_lower, tick_upper, %liquidity, amount0, amount1, "position burn");
    Ok((amount0, amount1))
  }

  /// Transfers up to the requested owed amounts to `owner`.
  pub fn collect(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    amount0_max: u64,
    amount1_max: u64,
  ) -> Result<(u64, u64)> {
    let Some(position) = self.positions.get_mut(&(*owner, tick_lower, tick_upper)) else {
      return Ok((0, 0));
    };
    let amount0 = position.tokens_owed_0.min(amount0_max);
    let amount1 = position.tokens_owed_1.min(amount1_max);
    position.tokens_owed_0 -= amount0;
    position.tokens_owed_1 -= amount1;
    ledger.transfer(&self.token0, &self.address, owner, amount0)?;
    ledger.transfer(&self.token1, &self.address, owner, amount1)?;
    Ok((amount0, amount1))
  }

  fn next_initialized_tick(&self, zero_for_one: bool) -> (i32, bool) {
    if zero_for_one {
      self
        .ticks
        .range(..=self.tick)
        .next_back()
        .map_or((MIN_TICK, false), |(tick, _)| (*tick, true))
    } else {
      self
        .ticks
        .range(self.tick + 1..)
        .next()
        .map_or((MAX_TICK, false), |(tick, _)| (*tick, true))
    }
  }

  /// Exact input swap walking initialized ticks until the input is spent
  /// or the price reaches `sqrt_price_limit_x64`. Returns
  /// `(amount_in, amount_out)` with the fee counted in the input.
  pub fn swap(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    zero_for_one: bool,
    amount_in: u64,
    sqrt_price_limit_x64: u128,
  ) -> Result<(u64, u64)> {
    let limit_valid = if zero_for_one {
      sqrt_price_limit_x64 < self.sqrt_price_x64
        && sqrt_price_limit_x64 > MIN_SQRT_PRICE_X64
    } else {
      sqrt_price_limit_x64 > self.sqrt_price_x64
        && sqrt_price_limit_x64 < MAX_SQRT_PRICE_X64
    };
    if !limit_valid {
      return Err(InvalidPriceLimit.into());
    }

    let mut remaining = amount_in;
    let (mut total_in, mut total_out, mut total_fee) = (0u64, 0u64, 0u64);
    while remaining > 0 && self.sqrt_price_x64 != sqrt_price_limit_x64 {
      let (next_tick, initialized) = self.next_initialized_tick(zero_for_one);
      let sqrt_next = sqrt_price_at_tick(next_tick)?;
      let target = if zero_for_one {
        sqrt_next.max(sqrt_price_limit_x64)
      } else {
        sqrt_next.min(sqrt_price_limit_x64)
      };
      let step = compute_swap_step(
        self.sqrt_price_x64,
        target,
        self.liquidity,
        remaining,
        self.fee_rate,
      )?;
      let spent = step
        .amount_in
        .checked_add(step.fee_amount)
        .ok_or(PoolArithmetic)?;
      remaining = remaining.checked_sub(spent).ok_or(PoolArithmetic)?;
      total_in += spent;
      total_out = total_out.checked_add(step.amount_out).ok_or(PoolArithmetic)?;
      total_fee += step.fee_amount;
      self.sqrt_price_x64 = step.sqrt_price_next;

      if step.sqrt_price_next == sqrt_next {
        if initialized {
          let net = self.ticks.get(&next_tick).map_or(0, |info| info.liquidity_net);
          let net = if zero_for_one { -net } else { net };
          self.liquidity = self
            .liquidity
            .checked_add_signed(net)
            .ok_or(PoolArithmetic)?;
        }
        self.tick = if zero_for_one { next_tick - 1 } else { next_tick };
      } else {
        self.tick = tick_at_sqrt_price(self.sqrt_price_x64)?;
      }
    }

    let (token_in, token_out) = if zero_for_one {
      self.fees.0 = self.fees.0.checked_add(total_fee).ok_or(PoolArithmetic)?;
      (self.token0, self.token1)
    } else {
      self.fees.1 = self.fees.1.checked_add(total_fee).ok_or(PoolArithmetic)?;
      (self.token1, self.token0)
    };
    ledger.transfer(&token_in, owner, &self.address, total_in)?;
    ledger.transfer(&token_out, &self.address, owner, total_out)?;
    debug!(zero_for_one, total_in, total_out, tick = self.tick, "pool swap");
    Ok((total_in, total_out))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const Q64: u128 = 1 << 64;
  const FUNDS: u64 = 1_000_000_000_000_000;

  struct Setup {
    ledger: Ledger,
    pool: ConcentratedPool,
    owner: Pubkey,
  }

  fn setup() -> Result<Setup> {
    let mut ledger = Ledger::new();
    let token_a = ledger.create_mint(6);
    let token_b = ledger.create_mint(6);
    let pool = ConcentratedPool::new(token_a, token_b, 500, Q64)?;
    let owner = Pubkey::new_unique();
    ledger.mint_to(&token_a, &owner, FUNDS)?;
    ledger.mint_to(&token_b, &owner, FUNDS)?;
    Ok(Setup { ledger, pool, owner })
  }

  #[test]
  fn mint_in_range_activates_liquidity() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    let (amount0, amount1) = pool.mint(&mut ledger, &owner, -100, 100, 1_000_000_000_000)?;
    assert!(amount0 > 0 && amount1 > 0);
    assert_eq!(amount0, amount1);
    assert_eq!(pool.state().liquidity, 1_000_000_000_000);
    assert_eq!(pool.position(&owner, -100, 100).liquidity, 1_000_000_000_000);
    Ok(())
  }

  #[test]
  fn mint_out_of_range_is_single_sided() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    let (amount0, amount1) = pool.mint(&mut ledger, &owner, 100, 200, 1_000_000_000_000)?;
    assert!(amount0 > 0);
    assert_eq!(amount1, 0);
    assert_eq!(pool.state().liquidity, 0);
    Ok(())
  }

  #[test]
  fn invalid_range_rejected() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    let out = pool.mint(&mut ledger, &owner, 10, 10, 1);
    assert_eq!(out, Err(InvalidTickRange.into()));
    let out = pool.mint(&mut ledger, &owner, MIN_TICK - 1, 0, 1);
    assert_eq!(out, Err(InvalidTickRange.into()));
    Ok(())
  }

  #[test]
  fn burn_then_collect_returns_tokens() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    let (minted0, minted1) = pool.mint(&mut ledger, &owner, -100, 100, 1_000_000_000_000)?;
    let (burned0, burned1) = pool.burn(&owner, -100, 100, 1_000_000_000_000)?;
    assert!(minted0 - burned0 <= 1 && minted1 - burned1 <= 1);
    assert_eq!(pool.state().liquidity, 0);
    let (collected0, collected1) =
      pool.collect(&mut ledger, &owner, -100, 100, u64::MAX, u64::MAX)?;
    assert_eq!((collected0, collected1), (burned0, burned1));
    assert_eq!(pool.position(&owner, -100, 100), ClPosition::default());
    Ok(())
  }

  #[test]
  fn burn_more_than_owned_rejected() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    pool.mint(&mut ledger, &owner, -100, 100, 1_000)?;
    let out = pool.burn(&owner, -100, 100, 1_001);
    assert_eq!(out, Err(InsufficientPositionLiquidity.into()));
    Ok(())
  }

  #[test]
  fn swap_stops_at_limit() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    pool.mint(&mut ledger, &owner, MIN_TICK, MAX_TICK, 1_000_000_000_000)?;
    let limit = sqrt_price_at_tick(-50)?;
    let (spent, received) = pool.swap(&mut ledger, &owner, true, FUNDS / 2, limit)?;
    assert_eq!(pool.state().sqrt_price_x64, limit);
    assert_eq!(pool.state().tick, -50);
    assert!(spent < FUNDS / 2);
    assert!(received < spent);
    assert!(pool.fees().0 > 0);
    Ok(())
  }

  #[test]
  fn swap_crosses_into_wider_range() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    pool.mint(&mut ledger, &owner, -100, 100, 1_000_000_000_000)?;
    pool.mint(&mut ledger, &owner, -1_000, 1_000, 1_000_000_000)?;
    assert_eq!(pool.state().liquidity, 1_001_000_000_000);
    let limit = sqrt_price_at_tick(500)?;
    pool.swap(&mut ledger, &owner, false, FUNDS / 2, limit)?;
    assert_eq!(pool.state().tick, 500);
    assert_eq!(pool.state().liquidity, 1_000_000_000);
    let limit = sqrt_price_at_tick(-500)?;
    pool.swap(&mut ledger, &owner, true, FUNDS / 2, limit)?;
    assert_eq!(pool.state().tick, -500);
    assert_eq!(pool.state().liquidity, 1_000_000_000);
    Ok(())
  }

  #[test]
  fn wrong_side_limit_rejected() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    pool.mint(&mut ledger, &owner, MIN_TICK, MAX_TICK, 1_000_000)?;
    let out = pool.swap(&mut ledger, &owner, true, 1_000, 2 * Q64);
    assert_eq!(out, Err(InvalidPriceLimit.into()));
    Ok(())
  }

  #[test]
  fn pool_balances_cover_owed_and_fees() -> Result<()> {
    let Setup { mut ledger, mut pool, owner } = setup()?;
    pool.mint(&mut ledger, &owner, -200, 200, 1_000_000_000_000)?;
    pool.swap(&mut ledger, &owner, true, 1_000_000, MIN_SQRT_PRICE_X64 + 1)?;
    let liquidity = pool.position(&owner, -200, 200).liquidity;
    let (owed0, owed1) = pool.burn(&owner, -200, 200, liquidity)?;
    assert!(ledger.balance_of(&pool.token0, &pool.address) >= owed0 + pool.fees().0);
    assert!(ledger.balance_of(&pool.token1, &pool.address) >= owed1 + pool.fees().1);
    Ok(())
  }
}
