//! Seams between the AMO and the systems it drives. Every collaborator
//! the AMO touches is reached through one of these traits.

use crate::pair_math::PairCurve;
use crate::roles::Role;

use anchor_lang::prelude::*;

/// Role registry plus the shared pause flag.
pub trait Authority {
  fn has_role(&self, role: Role, account: &Pubkey) -> bool;
  fn paused(&self) -> bool;
  fn set_paused(&mut self, paused: bool);
}

/// Fungible token balances.
pub trait TokenLedger {
  fn decimals(&self, mint: &Pubkey) -> Result<u8>;
  fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64;
  fn transfer(
    &mut self,
    mint: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u64,
  ) -> Result<()>;
}

/// BOOST issuance. The Minter checks `caller` holds its own AMO role.
pub trait BoostMinter {
  fn boost_mint(&self) -> Pubkey;
  fn protocol_mint(
    &mut self,
    caller: &Pubkey,
    to: &Pubkey,
    amount: u64,
  ) -> Result<()>;
  fn protocol_burn(
    &mut self,
    caller: &Pubkey,
    from: &Pubkey,
    amount: u64,
  ) -> Result<()>;
}

/// Router, pair and gauge of a Solidly style pool.
pub trait PairVenue {
  /// `(token0, token1)` as stored by the pair.
  fn pair_tokens(&self) -> (Pubkey, Pubkey);
  fn pair_curve(&self) -> PairCurve;
  /// Reserves in `(token0, token1)` order.
  fn pair_reserves(&self) -> (u64, u64);
  fn lp_mint(&self) -> Pubkey;
  fn lp_total_supply(&self) -> u64;

  /// Deposits at the current ratio, returning `(used_a, used_b, lp)`.
  #[allow(clippy::too_many_arguments)]
  fn add_liquidity(
    &mut self,
    owner: &Pubkey,
    token_a: &Pubkey,
    token_b: &Pubkey,
    amount_a_desired: u64,
    amount_b_desired: u64,
    amount_a_min: u64,
    amount_b_min: u64,
    deadline: i64,
  ) -> Result<(u64, u64, u64)>;

  /// Burns LP, returning `(amount_a, amount_b)`.
  #[allow(clippy::too_many_arguments)]
  fn remove_liquidity(
    &mut self,
    owner: &Pubkey,
    token_a: &Pubkey,
    token_b: &Pubkey,
    liquidity: u64,
    amount_a_min: u64,
    amount_b_min: u64,
    deadline: i64,
  ) -> Result<(u64, u64)>;

  fn swap_exact_tokens_for_tokens(
    &mut self,
    owner: &Pubkey,
    token_in: &Pubkey,
    amount_in: u64,
    amount_out_min: u64,
    deadline: i64,
  ) -> Result<u64>;

  fn has_gauge(&self) -> bool;
  fn gauge_deposit(
    &mut self,
    owner: &Pubkey,
    amount: u64,
    token_id: Option<u64>,
  ) -> Result<()>;
  fn gauge_withdraw(&mut self, owner: &Pubkey, amount: u64) -> Result<()>;
  fn gauge_balance(&self, owner: &Pubkey) -> u64;
  /// Pays accrued rewards for `tokens` to `owner`.
  fn gauge_get_reward(
    &mut self,
    owner: &Pubkey,
    tokens: &[Pubkey],
  ) -> Result<Vec<(Pubkey, u64)>>;
}

/// Price and liquidity of a concentrated pool at the current tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClPoolState {
  pub sqrt_price_x64: u128,
  pub tick: i32,
  pub liquidity: u128,
  pub fee_rate: u32,
}

/// Liquidity owned in one range, with tokens owed but not collected.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClPosition {
  pub liquidity: u128,
  pub tokens_owed_0: u64,
  pub tokens_owed_1: u64,
}

/// Concentrated liquidity pool, positions keyed by owner and range.
pub trait ClVenue {
  fn pool_tokens(&self) -> (Pubkey, Pubkey);
  fn pool_state(&self) -> ClPoolState;
  fn pool_position(
    &self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
  ) -> ClPosition;

  /// Adds liquidity, pulling `(amount0, amount1)` from `owner`.
  fn pool_mint(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
  ) -> Result<(u64, u64)>;

  /// Removes liquidity, crediting the amounts as owed.
  fn pool_burn(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
  ) -> Result<(u64, u64)>;

  fn pool_collect(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    amount0_max: u64,
    amount1_max: u64,
  ) -> Result<(u64, u64)>;

  /// Exact input swap stopping at `sqrt_price_limit_x64`, returning
  /// `(amount_in, amount_out)` actually exchanged.
  fn pool_swap(
    &mut self,
    owner: &Pubkey,
    zero_for_one: bool,
    amount_in: u64,
    sqrt_price_limit_x64: u128,
  ) -> Result<(u64, u64)>;
}
