//! Fixtures shared by the AMO integration tests: a BOOST/USD pool seeded
//! 11M/11M at peg, with every unit of liquidity owned by the AMO.

#![allow(dead_code)]

use anchor_lang::error::{ComparedValues, Error};
use anchor_lang::prelude::Pubkey;
use anyhow::Result;
use boost_amo::{ConcentratedAdapter, ConcentratedAmo, SolidlyV2Adapter, SolidlyV2Amo};
use boost_core::clmm_math::{
  amounts_for_liquidity, liquidity_for_amounts, sqrt_price_at_tick,
  MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK,
};
use boost_core::conversion::TokenScale;
use boost_core::error::CoreError::MissingRole;
use boost_core::pair_math::{PairCurve, PairKind};
use boost_core::params::PegParameters;
use boost_core::price::peg_sqrt_price_x64;
use boost_core::ratio::FACTOR;
use boost_core::roles::Role;
use boost_core::clock::SolanaClock;
use boost_core::venue::{
  Authority, BoostMinter, ClPoolState, ClPosition, ClVenue, PairVenue,
  TokenLedger,
};
use boost_sim::error::SimError::ZeroLiquidity;
use boost_sim::{Chain, ClChain, PairChain};
use tracing_subscriber::EnvFilter;

pub const SCALE: TokenScale = TokenScale {
  boost_decimals: 9,
  usd_decimals: 6,
};
pub const ONE_BOOST: u64 = 1_000_000_000;
pub const ONE_USD: u64 = 1_000_000;
pub const SEED_BOOST: u64 = 11_000_000 * ONE_BOOST;
pub const SEED_USD: u64 = 11_000_000 * ONE_USD;
pub const CL_FEE_RATE: u32 = 500;

pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

/// Defaults with every public usage ratio at 1.0, so one public call
/// closes the whole gap.
pub fn full_ratios() -> PegParameters {
  PegParameters {
    boost_sell_ratio: FACTOR,
    usd_buy_ratio: FACTOR,
    usd_usage_ratio: FACTOR,
    ..PegParameters::default()
  }
}

/// `(boost, usd)` held by `owner`.
pub fn balances<V>(chain: &Chain<V>, owner: &Pubkey) -> (u64, u64) {
  (
    chain.balance_of(&chain.boost(), owner),
    chain.balance_of(&chain.usd_mint, owner),
  )
}

pub fn assert_missing_role<T: std::fmt::Debug>(
  out: anchor_lang::Result<T>,
  account: &Pubkey,
  role: Role,
) {
  let error = out.expect_err("expected missing role");
  assert_eq!(error, MissingRole.into());
  let Error::AnchorError(error) = error else {
    panic!("expected an anchor error");
  };
  let Some(ComparedValues::Values((left, right))) = error.compared_values else {
    panic!("expected compared values");
  };
  assert_eq!(left, account.to_string());
  assert_eq!(right, role.to_string());
}

pub fn within(price: u64, target: u64, tolerance: u64) -> bool {
  price.abs_diff(target) <= tolerance
}

pub struct PairContext {
  pub chain: PairChain,
  pub amo: SolidlyV2Amo,
  pub admin: Pubkey,
  pub user: Pubkey,
  pub vault: Pubkey,
}

impl PairContext {
  pub fn volatile(params: PegParameters) -> Result<Self> {
    Self::new(PairKind::Volatile, params, true)
  }

  pub fn stable(params: PegParameters) -> Result<Self> {
    Self::new(PairKind::Stable, params, true)
  }

  pub fn new(kind: PairKind, params: PegParameters, with_gauge: bool) -> Result<Self> {
    init_tracing();
    let fee_bps = match kind {
      PairKind::Volatile => 30,
      PairKind::Stable => 5,
    };
    let mut chain = PairChain::new(SCALE, PairCurve::new(kind, fee_bps), with_gauge)?;
    let (amo_id, admin, user, vault) = (
      Pubkey::new_unique(),
      Pubkey::new_unique(),
      Pubkey::new_unique(),
      Pubkey::new_unique(),
    );
    chain.register_amo(amo_id);
    chain.roles.grant_all(admin);

    let (boost, usd) = (chain.boost(), chain.usd_mint);
    chain.protocol_mint(&amo_id, &amo_id, SEED_BOOST)?;
    chain.airdrop(&usd, &amo_id, SEED_USD)?;
    let now = chain.clock.unix_timestamp;
    let (_, _, lp) =
      chain.add_liquidity(&amo_id, &boost, &usd, SEED_BOOST, SEED_USD, 0, 0, now)?;
    if with_gauge {
      chain.gauge_deposit(&amo_id, lp, None)?;
    }

    let amo = SolidlyV2Amo::new(&chain, amo_id, usd, params, SolidlyV2Adapter::new(vault))?;
    Ok(PairContext {
      chain,
      amo,
      admin,
      user,
      vault,
    })
  }

  pub fn now(&self) -> i64 {
    self.chain.clock.unix_timestamp
  }

  pub fn price(&self) -> Result<u64> {
    Ok(self.amo.boost_price(&self.chain)?.bits)
  }

  pub fn amo_balances(&self) -> (u64, u64) {
    balances(&self.chain, &self.amo.id())
  }

  /// A user buys BOOST with fresh USD, pushing the price up.
  pub fn user_buys_boost(&mut self, usd_amount: u64) -> Result<u64> {
    let usd = self.chain.usd_mint;
    self.chain.airdrop(&usd, &self.user, usd_amount)?;
    let now = self.now();
    let user = self.user;
    Ok(self.chain.swap_exact_tokens_for_tokens(&user, &usd, usd_amount, 0, now)?)
  }

  /// A user dumps BOOST bought elsewhere, pushing the price down.
  pub fn user_sells_boost(&mut self, boost_amount: u64) -> Result<u64> {
    let boost = self.chain.boost();
    self.chain.airdrop(&boost, &self.user, boost_amount)?;
    let now = self.now();
    let user = self.user;
    Ok(self.chain.swap_exact_tokens_for_tokens(&user, &boost, boost_amount, 0, now)?)
  }
}

pub struct ClContext {
  pub chain: ClChain,
  pub amo: ConcentratedAmo,
  pub admin: Pubkey,
  pub user: Pubkey,
  /// Liquidity of the seeded full-range position.
  pub seeded: u128,
}

impl ClContext {
  pub fn new(usd_first: bool, params: PegParameters) -> Result<Self> {
    init_tracing();
    let mut chain = ClChain::new(SCALE, CL_FEE_RATE, FACTOR, usd_first)?;
    let (amo_id, admin, user) = (
      Pubkey::new_unique(),
      Pubkey::new_unique(),
      Pubkey::new_unique(),
    );
    chain.register_amo(amo_id);
    chain.roles.grant_all(admin);

    let (boost, usd) = (chain.boost(), chain.usd_mint);
    let boost_is_token0 = chain.pool_tokens().0 == boost;
    let sqrt_price = chain.pool_state().sqrt_price_x64;
    let (sqrt_lower, sqrt_upper) =
      (sqrt_price_at_tick(MIN_TICK)?, sqrt_price_at_tick(MAX_TICK)?);
    let (budget0, budget1) = if boost_is_token0 {
      (SEED_BOOST, SEED_USD)
    } else {
      (SEED_USD, SEED_BOOST)
    };
    let seeded =
      liquidity_for_amounts(sqrt_price, sqrt_lower, sqrt_upper, budget0, budget1)?;
    let (amount0, amount1) =
      amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, seeded, true)?;
    let (boost_needed, usd_needed) = if boost_is_token0 {
      (amount0, amount1)
    } else {
      (amount1, amount0)
    };
    chain.protocol_mint(&amo_id, &amo_id, boost_needed)?;
    chain.airdrop(&usd, &amo_id, usd_needed)?;
    chain.pool_mint(&amo_id, MIN_TICK, MAX_TICK, seeded)?;

    let adapter = ConcentratedAdapter::new(
      MIN_TICK,
      MAX_TICK,
      peg_sqrt_price_x64(boost_is_token0, SCALE)?,
    )?;
    let amo = ConcentratedAmo::new(&chain, amo_id, usd, params, adapter)?;
    Ok(ClContext {
      chain,
      amo,
      admin,
      user,
      seeded,
    })
  }

  pub fn now(&self) -> i64 {
    self.chain.clock.unix_timestamp
  }

  pub fn price(&self) -> Result<u64> {
    Ok(self.amo.boost_price(&self.chain)?.bits)
  }

  pub fn amo_balances(&self) -> (u64, u64) {
    balances(&self.chain, &self.amo.id())
  }

  fn user_swap(&mut self, token_in: Pubkey, amount: u64) -> Result<u64> {
    self.chain.airdrop(&token_in, &self.user, amount)?;
    let zero_for_one = self.chain.pool_tokens().0 == token_in;
    let limit = if zero_for_one {
      MIN_SQRT_PRICE_X64 + 1
    } else {
      MAX_SQRT_PRICE_X64 - 1
    };
    let user = self.user;
    let (_, out) = self.chain.pool_swap(&user, zero_for_one, amount, limit)?;
    Ok(out)
  }

  pub fn user_buys_boost(&mut self, usd_amount: u64) -> Result<u64> {
    let usd = self.chain.usd_mint;
    self.user_swap(usd, usd_amount)
  }

  pub fn user_sells_boost(&mut self, boost_amount: u64) -> Result<u64> {
    let boost = self.chain.boost();
    self.user_swap(boost, boost_amount)
  }
}

/// Concentrated chain whose pool accepts every call except new deposits.
#[derive(Clone)]
pub struct DepositsRefused(pub ClChain);

impl TokenLedger for DepositsRefused {
  fn decimals(&self, mint: &Pubkey) -> anchor_lang::Result<u8> {
    self.0.decimals(mint)
  }

  fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
    self.0.balance_of(mint, owner)
  }

  fn transfer(
    &mut self,
    mint: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u64,
  ) -> anchor_lang::Result<()> {
    self.0.transfer(mint, from, to, amount)
  }
}

impl BoostMinter for DepositsRefused {
  fn boost_mint(&self) -> Pubkey {
    self.0.boost_mint()
  }

  fn protocol_mint(
    &mut self,
    caller: &Pubkey,
    to: &Pubkey,
    amount: u64,
  ) -> anchor_lang::Result<()> {
    self.0.protocol_mint(caller, to, amount)
  }

  fn protocol_burn(
    &mut self,
    caller: &Pubkey,
    from: &Pubkey,
    amount: u64,
  ) -> anchor_lang::Result<()> {
    self.0.protocol_burn(caller, from, amount)
  }
}

impl Authority for DepositsRefused {
  fn has_role(&self, role: Role, account: &Pubkey) -> bool {
    self.0.has_role(role, account)
  }

  fn paused(&self) -> bool {
    self.0.paused()
  }

  fn set_paused(&mut self, paused: bool) {
    self.0.set_paused(paused);
  }
}

impl SolanaClock for DepositsRefused {
  fn slot(&self) -> u64 {
    self.0.slot()
  }

  fn epoch(&self) -> u64 {
    self.0.epoch()
  }

  fn unix_timestamp(&self) -> i64 {
    self.0.unix_timestamp()
  }
}

impl ClVenue for DepositsRefused {
  fn pool_tokens(&self) -> (Pubkey, Pubkey) {
    self.0.pool_tokens()
  }

  fn pool_state(&self) -> ClPoolState {
    self.0.pool_state()
  }

  fn pool_position(&self, owner: &Pubkey, tick_lower: i32, tick_upper: i32) -> ClPosition {
    self.0.pool_position(owner, tick_lower, tick_upper)
  }

  fn pool_mint(
    &mut self,
    _owner: &Pubkey,
    _tick_lower: i32,
    _tick_upper: i32,
    _liquidity: u128,
  ) -> anchor_lang::Result<(u64, u64)> {
    Err(ZeroLiquidity.into())
  }

  fn pool_burn(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
  ) -> anchor_lang::Result<(u64, u64)> {
    self.0.pool_burn(owner, tick_lower, tick_upper, liquidity)
  }

  fn pool_collect(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    amount0_max: u64,
    amount1_max: u64,
  ) -> anchor_lang::Result<(u64, u64)> {
    self
      .0
      .pool_collect(owner, tick_lower, tick_upper, amount0_max, amount1_max)
  }

  fn pool_swap(
    &mut self,
    owner: &Pubkey,
    zero_for_one: bool,
    amount_in: u64,
    sqrt_price_limit_x64: u128,
  ) -> anchor_lang::Result<(u64, u64)> {
    self
      .0
      .pool_swap(owner, zero_for_one, amount_in, sqrt_price_limit_x64)
  }
}
