use crate::error::SimError::{
  InsufficientAmountA, InsufficientAmountB, InsufficientLiquidityBurned,
  InsufficientLiquidityMinted, InsufficientOutputAmount, InvalidToken,
  PoolArithmetic,
};
use crate::ledger::Ledger;

use anchor_lang::prelude::*;
use boost_core::error::CoreError::EmptyPool;
use boost_core::pair_math::{quote, share_of_reserve, PairCurve, MINIMUM_LIQUIDITY};
use boost_core::venue::TokenLedger;
use integer_sqrt::IntegerSquareRoot;
use tracing::debug;

/// LP token precision.
pub const LP_DECIMALS: u8 = 9;

/// Solidly style pair with its router entry points folded in. Swap fees
/// leave the reserves for a separate fee account.
#[derive(Clone, Debug)]
pub struct SolidlyPair {
  pub address: Pubkey,
  pub fee_account: Pubkey,
  pub lp_mint: Pubkey,
  pub token0: Pubkey,
  pub token1: Pubkey,
  decimals0: u8,
  decimals1: u8,
  curve: PairCurve,
  reserve0: u64,
  reserve1: u64,
}

impl SolidlyPair {
  pub fn new(
    ledger: &mut Ledger,
    token_a: Pubkey,
    token_b: Pubkey,
    curve: PairCurve,
  ) -> Result<SolidlyPair> {
    let (token0, token1) = if token_a < token_b {
      (token_a, token_b)
    } else {
      (token_b, token_a)
    };
    Ok(SolidlyPair {
      address: Pubkey::new_unique(),
      fee_account: Pubkey::new_unique(),
      lp_mint: ledger.create_mint(LP_DECIMALS),
      token0,
      token1,
      decimals0: ledger.decimals(&token0)?,
      decimals1: ledger.decimals(&token1)?,
      curve,
      reserve0: 0,
      reserve1: 0,
    })
  }

  #[must_use]
  pub fn curve(&self) -> PairCurve {
    self.curve
  }

  #[must_use]
  pub fn reserves(&self) -> (u64, u64) {
    (self.reserve0, self.reserve1)
  }

  /// Whether `token` is `token0`.
  fn is_token0(&self, token: &Pubkey) -> Result<bool> {
    if *token == self.token0 {
      Ok(true)
    } else if *token == self.token1 {
      Ok(false)
    } else {
      Err(InvalidToken.into())
    }
  }

  /// Reserves ordered as `(token, other)`.
  fn reserves_for(&self, token: &Pubkey) -> Result<(u64, u64)> {
    Ok(if self.is_token0(token)? {
      (self.reserve0, self.reserve1)
    } else {
      (self.reserve1, self.reserve0)
    })
  }

  fn set_reserves_for(&mut self, token: &Pubkey, reserve: u64, other: u64) -> Result<()> {
    if self.is_token0(token)? {
      self.reserve0 = reserve;
      self.reserve1 = other;
    } else {
      self.reserve1 = reserve;
      self.reserve0 = other;
    }
    Ok(())
  }

  fn optimal_amounts(
    &self,
    token_a: &Pubkey,
    amount_a_desired: u64,
    amount_b_desired: u64,
    amount_a_min: u64,
    amount_b_min: u64,
  ) -> Result<(u64, u64)> {
    let (reserve_a, reserve_b) = self.reserves_for(token_a)?;
    if reserve_a == 0 && reserve_b == 0 {
      return Ok((amount_a_desired, amount_b_desired));
    }
    let amount_b_optimal = quote(amount_a_desired, reserve_a, reserve_b)?;
    if amount_b_optimal <= amount_b_desired {
      if amount_b_optimal < amount_b_min {
        return Err(InsufficientAmountB.into());
      }
      Ok((amount_a_desired, amount_b_optimal))
    } else {
      let amount_a_optimal = quote(amount_b_desired, reserve_b, reserve_a)?;
      if amount_a_optimal > amount_a_desired || amount_a_optimal < amount_a_min {
        return Err(InsufficientAmountA.into());
      }
      Ok((amount_a_optimal, amount_b_desired))
    }
  }

  /// Deposits both tokens at the current ratio and mints LP to `owner`.
  /// The first deposit locks [`MINIMUM_LIQUIDITY`] forever.
  #[allow(clippy::too_many_arguments)]
  pub fn add_liquidity(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    token_a: &Pubkey,
    token_b: &Pubkey,
    amount_a_desired: u64,
    amount_b_desired: u64,
    amount_a_min: u64,
    amount_b_min: u64,
  ) -> Result<(u64, u64, u64)> {
    if self.is_token0(token_a)? == self.is_token0(token_b)? {
      return Err(InvalidToken.into());
    }
    let (amount_a, amount_b) = self.optimal_amounts(
      token_a,
      amount_a_desired,
      amount_b_desired,
      amount_a_min,
      amount_b_min,
    )?;
    let (reserve_a, reserve_b) = self.reserves_for(token_a)?;
    let supply = ledger.supply(&self.lp_mint);
    let liquidity = if supply == 0 {
      let root = (u128::from(amount_a) * u128::from(amount_b)).integer_sqrt();
      let root = u64::try_from(root).map_err(|_| PoolArithmetic)?;
      let liquidity = root
        .checked_sub(MINIMUM_LIQUIDITY)
        .ok_or(InsufficientLiquidityMinted)?;
      ledger.mint_to(&self.lp_mint, &Pubkey::default(), MINIMUM_LIQUIDITY)?;
      liquidity
    } else {
      let from_a = quote(amount_a, reserve_a, supply)?;
      let from_b = quote(amount_b, reserve_b, supply)?;
      from_a.min(from_b)
    };
    if liquidity == 0 {
      return Err(InsufficientLiquidityMinted.into());
    }
    ledger.transfer(token_a, owner, &self.address, amount_a)?;
    ledger.transfer(token_b, owner, &self.address, amount_b)?;
    ledger.mint_to(&self.lp_mint, owner, liquidity)?;
    self.set_reserves_for(
      token_a,
      reserve_a.checked_add(amount_a).ok_or(PoolArithmetic)?,
      reserve_b.checked_add(amount_b).ok_or(PoolArithmetic)?,
    )?;
    debug!(amount_a, amount_b, liquidity, "pair deposit");
    Ok((amount_a, amount_b, liquidity))
  }

  /// Burns `liquidity` from `owner` and pays out its share of reserves.
  #[allow(clippy::too_many_arguments)]
  pub fn remove_liquidity(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    token_a: &Pubkey,
    token_b: &Pubkey,
    liquidity: u64,
    amount_a_min: u64,
    amount_b_min: u64,
  ) -> Result<(u64, u64)> {
    if self.is_token0(token_a)? == self.is_token0(token_b)? {
      return Err(InvalidToken.into());
    }
    let (reserve_a, reserve_b) = self.reserves_for(token_a)?;
    let supply = ledger.supply(&self.lp_mint);
    let amount_a = share_of_reserve(liquidity, reserve_a, supply)?;
    let amount_b = share_of_reserve(liquidity, reserve_b, supply)?;
    if amount_a == 0 || amount_b == 0 {
      return Err(InsufficientLiquidityBurned.into());
    }
    if amount_a < amount_a_min {
      return Err(InsufficientAmountA.into());
    }
    if amount_b < amount_b_min {
      return Err(InsufficientAmountB.into());
    }
    ledger.burn_from(&self.lp_mint, owner, liquidity)?;
    ledger.transfer(token_a, &self.address, owner, amount_a)?;
    ledger.transfer(token_b, &self.address, owner, amount_b)?;
    self.set_reserves_for(token_a, reserve_a - amount_a, reserve_b - amount_b)?;
    debug!(amount_a, amount_b, liquidity, "pair withdrawal");
    Ok((amount_a, amount_b))
  }

  /// Exact input swap. Fails if the output falls short of
  /// `amount_out_min`.
  pub fn swap(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    token_in: &Pubkey,
    amount_in: u64,
    amount_out_min: u64,
  ) -> Result<u64> {
    let is_token0 = self.is_token0(token_in)?;
    let token_out = if is_token0 { self.token1 } else { self.token0 };
    let (reserve_in, reserve_out) = self.reserves_for(token_in)?;
    if reserve_in == 0 || reserve_out == 0 {
      return Err(EmptyPool.into());
    }
    let (decimals_in, decimals_out) = if is_token0 {
      (self.decimals0, self.decimals1)
    } else {
      (self.decimals1, self.decimals0)
    };
    let outcome = self.curve.swap(
      amount_in,
      reserve_in,
      reserve_out,
      decimals_in,
      decimals_out,
    )?;
    if outcome.amount_out == 0 || outcome.amount_out < amount_out_min {
      return Err(InsufficientOutputAmount.into());
    }
    ledger.transfer(token_in, owner, &self.address, amount_in)?;
    ledger.transfer(token_in, &self.address, &self.fee_account, outcome.fee)?;
    ledger.transfer(&token_out, &self.address, owner, outcome.amount_out)?;
    self.set_reserves_for(token_in, outcome.reserve_in, outcome.reserve_out)?;
    debug!(amount_in, amount_out = outcome.amount_out, "pair swap");
    Ok(outcome.amount_out)
  }
}
