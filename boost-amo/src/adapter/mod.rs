//! Pool family seam. An AMO holds one adapter and only ever talks to its
//! pool through it.

pub mod concentrated;
pub mod solidly;

pub use concentrated::ConcentratedAdapter;
pub use solidly::SolidlyV2Adapter;

use anchor_lang::prelude::*;
use boost_core::conversion::TokenScale;
use boost_core::events::AmoEvent;
use boost_core::snapshot::PoolSnapshot;

/// Addresses and precision of the AMO's own token accounts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AmoAccount {
  pub id: Pubkey,
  pub boost: Pubkey,
  pub usd: Pubkey,
  pub scale: TokenScale,
}

/// Tokens actually exchanged by a swap.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapFill {
  pub boost: u64,
  pub usd: u64,
}

/// Tokens moved by a liquidity change, with the liquidity it minted or
/// burned. Pair liquidity is LP token units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LiquidityFill {
  pub boost: u64,
  pub usd: u64,
  pub liquidity: u128,
}

/// Liquidity the AMO owns in its pool and what it is worth right now.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionInfo {
  pub liquidity: u128,
  pub boost: u64,
  pub usd: u64,
}

pub trait PoolAdapter<E>: Clone {
  /// Fresh view of the pool for the decision engine.
  fn snapshot(&self, env: &E, account: &AmoAccount) -> Result<PoolSnapshot>;

  /// Sells up to `boost_amount` for USD.
  fn sell_boost(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    boost_amount: u64,
    min_usd_out: u64,
    deadline: i64,
  ) -> Result<SwapFill>;

  /// Spends up to `usd_amount` buying BOOST.
  fn buy_boost(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    usd_amount: u64,
    min_boost_out: u64,
    deadline: i64,
  ) -> Result<SwapFill>;

  /// Deposits from the given budgets, staking where the pool supports it.
  #[allow(clippy::too_many_arguments)]
  fn add_liquidity(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    boost_amount: u64,
    usd_amount: u64,
    min_boost_spent: u64,
    min_usd_spent: u64,
    deadline: i64,
  ) -> Result<LiquidityFill>;

  /// `(boost, usd)` a deposit from these budgets would take right now.
  fn quote_add_liquidity(
    &self,
    env: &E,
    account: &AmoAccount,
    boost_amount: u64,
    usd_amount: u64,
  ) -> Result<(u64, u64)>;

  /// Withdraws `liquidity` and returns the tokens to the AMO.
  fn remove_liquidity(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    liquidity: u128,
    min_boost_removed: u64,
    min_usd_removed: u64,
    deadline: i64,
  ) -> Result<LiquidityFill>;

  fn position(&self, env: &E, account: &AmoAccount) -> Result<PositionInfo>;

  /// Event recording a completed deposit.
  fn liquidity_event(&self, fill: &LiquidityFill) -> Result<AmoEvent>;
}
