//! A single in-memory "chain" bundling the ledger, the BOOST Minter, role
//! registry, clock and one pool venue. AMOs drive it through the
//! collaborator traits.

use crate::cl_pool::ConcentratedPool;
use crate::clock::SimClock;
use crate::error::SimError::{Expired, NoGauge};
use crate::gauge::Gauge;
use crate::ledger::Ledger;
use crate::minter::Minter;
use crate::pair::SolidlyPair;
use crate::registry::RoleRegistry;

use anchor_lang::prelude::*;
use boost_core::clock::SolanaClock;
use boost_core::conversion::TokenScale;
use boost_core::pair_math::PairCurve;
use boost_core::price::boost_price_to_sqrt_price;
use boost_core::roles::Role;
use boost_core::venue::{
  Authority, BoostMinter, ClPoolState, ClPosition, ClVenue, PairVenue,
  TokenLedger,
};
use fix::prelude::*;

/// Solidly pair plus its optional gauge.
#[derive(Clone, Debug)]
pub struct SolidlyVenue {
  pub pair: SolidlyPair,
  pub gauge: Option<Gauge>,
}

#[derive(Clone, Debug)]
pub struct Chain<V> {
  pub ledger: Ledger,
  pub minter: Minter,
  pub roles: RoleRegistry,
  pub clock: SimClock,
  pub usd_mint: Pubkey,
  pub venue: V,
}

pub type PairChain = Chain<SolidlyVenue>;
pub type ClChain = Chain<ConcentratedPool>;

/// Creates BOOST and USD mints in the requested address order.
fn create_mints(
  ledger: &mut Ledger,
  scale: TokenScale,
  usd_first: bool,
) -> (Pubkey, Pubkey) {
  if usd_first {
    let usd = ledger.create_mint(scale.usd_decimals);
    (ledger.create_mint(scale.boost_decimals), usd)
  } else {
    let boost = ledger.create_mint(scale.boost_decimals);
    (boost, ledger.create_mint(scale.usd_decimals))
  }
}

impl<V> Chain<V> {
  #[must_use]
  pub fn boost(&self) -> Pubkey {
    self.minter.mint()
  }

  #[must_use]
  pub fn scale(&self) -> TokenScale {
    TokenScale::new(
      self.ledger.decimals(&self.boost()).unwrap_or_default(),
      self.ledger.decimals(&self.usd_mint).unwrap_or_default(),
    )
  }

  /// Credits `amount` of `mint` out of thin air.
  pub fn airdrop(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<()> {
    self.ledger.mint_to(mint, owner, amount)
  }

  /// Grants `account` the Minter's AMO role and the gate's AMO role.
  pub fn register_amo(&mut self, account: Pubkey) {
    self.minter.grant_amo(account);
    self.roles.grant(Role::Amo, account);
  }

  fn ensure_live(&self, deadline: i64) -> Result<()> {
    if self.clock.unix_timestamp > deadline {
      Err(Expired.into())
    } else {
      Ok(())
    }
  }
}

impl PairChain {
  /// Empty BOOST/USD pair, optionally with a gauge.
  pub fn new(scale: TokenScale, curve: PairCurve, with_gauge: bool) -> Result<PairChain> {
    let mut ledger = Ledger::new();
    let (boost, usd) = create_mints(&mut ledger, scale, false);
    let pair = SolidlyPair::new(&mut ledger, boost, usd, curve)?;
    let gauge = with_gauge.then(|| Gauge::new(pair.lp_mint));
    Ok(Chain {
      ledger,
      minter: Minter::new(boost),
      roles: RoleRegistry::new(),
      clock: SimClock::at(1_700_000_000),
      usd_mint: usd,
      venue: SolidlyVenue { pair, gauge },
    })
  }

  /// Streams `amount` of `token` from `funder` into the gauge.
  pub fn notify_reward(&mut self, funder: &Pubkey, token: &Pubkey, amount: u64) -> Result<()> {
    let gauge = self.venue.gauge.as_mut().ok_or(NoGauge)?;
    gauge.notify_reward(&mut self.ledger, funder, token, amount)
  }
}

impl ClChain {
  /// Empty BOOST/USD pool opened at `boost_price`.
  pub fn new(
    scale: TokenScale,
    fee_rate: u32,
    boost_price: UFix64<N6>,
    usd_first: bool,
  ) -> Result<ClChain> {
    let mut ledger = Ledger::new();
    let (boost, usd) = create_mints(&mut ledger, scale, usd_first);
    let sqrt_price = boost_price_to_sqrt_price(boost_price, boost < usd, scale)?;
    Ok(Chain {
      ledger,
      minter: Minter::new(boost),
      roles: RoleRegistry::new(),
      clock: SimClock::at(1_700_000_000),
      usd_mint: usd,
      venue: ConcentratedPool::new(boost, usd, fee_rate, sqrt_price)?,
    })
  }
}

impl<V> TokenLedger for Chain<V> {
  fn decimals(&self, mint: &Pubkey) -> Result<u8> {
    self.ledger.decimals(mint)
  }

  fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
    self.ledger.balance_of(mint, owner)
  }

  fn transfer(
    &mut self,
    mint: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u64,
  ) -> Result<()> {
    self.ledger.transfer(mint, from, to, amount)
  }
}

impl<V> BoostMinter for Chain<V> {
  fn boost_mint(&self) -> Pubkey {
    self.minter.mint()
  }

  fn protocol_mint(&mut self, caller: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
    self.minter.protocol_mint(&mut self.ledger, caller, to, amount)
  }

  fn protocol_burn(&mut self, caller: &Pubkey, from: &Pubkey, amount: u64) -> Result<()> {
    self.minter.protocol_burn(&mut self.ledger, caller, from, amount)
  }
}

impl<V> Authority for Chain<V> {
  fn has_role(&self, role: Role, account: &Pubkey) -> bool {
    self.roles.has_role(role, account)
  }

  fn paused(&self) -> bool {
    self.roles.paused()
  }

  fn set_paused(&mut self, paused: bool) {
    self.roles.set_paused(paused);
  }
}

impl<V> SolanaClock for Chain<V> {
  fn slot(&self) -> u64 {
    self.clock.slot
  }

  fn epoch(&self) -> u64 {
    self.clock.epoch
  }

  fn unix_timestamp(&self) -> i64 {
    self.clock.unix_timestamp
  }
}

impl PairVenue for PairChain {
  fn pair_tokens(&self) -> (Pubkey, Pubkey) {
    (self.venue.pair.token0, self.venue.pair.token1)
  }

  fn pair_curve(&self) -> PairCurve {
    self.venue.pair.curve()
  }

  fn pair_reserves(&self) -> (u64, u64) {
    self.venue.pair.reserves()
  }

  fn lp_mint(&self) -> Pubkey {
    self.venue.pair.lp_mint
  }

  fn lp_total_supply(&self) -> u64 {
    self.ledger.supply(&self.venue.pair.lp_mint)
  }

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
  ) -> Result<(u64, u64, u64)> {
    self.ensure_live(deadline)?;
    self.venue.pair.add_liquidity(
      &mut self.ledger,
      owner,
      token_a,
      token_b,
      amount_a_desired,
      amount_b_desired,
      amount_a_min,
      amount_b_min,
    )
  }

  fn remove_liquidity(
    &mut self,
    owner: &Pubkey,
    token_a: &Pubkey,
    token_b: &Pubkey,
    liquidity: u64,
    amount_a_min: u64,
    amount_b_min: u64,
    deadline: i64,
  ) -> Result<(u64, u64)> {
    self.ensure_live(deadline)?;
    self.venue.pair.remove_liquidity(
      &mut self.ledger,
      owner,
      token_a,
      token_b,
      liquidity,
      amount_a_min,
      amount_b_min,
    )
  }

  fn swap_exact_tokens_for_tokens(
    &mut self,
    owner: &Pubkey,
    token_in: &Pubkey,
    amount_in: u64,
    amount_out_min: u64,
    deadline: i64,
  ) -> Result<u64> {
    self.ensure_live(deadline)?;
    self
      .venue
      .pair
      .swap(&mut self.ledger, owner, token_in, amount_in, amount_out_min)
  }

  fn has_gauge(&self) -> bool {
    self.venue.gauge.is_some()
  }

  fn gauge_deposit(&mut self, owner: &Pubkey, amount: u64, token_id: Option<u64>) -> Result<()> {
    let gauge = self.venue.gauge.as_mut().ok_or(NoGauge)?;
    gauge.deposit(&mut self.ledger, owner, amount, token_id)
  }

  fn gauge_withdraw(&mut self, owner: &Pubkey, amount: u64) -> Result<()> {
    let gauge = self.venue.gauge.as_mut().ok_or(NoGauge)?;
    gauge.withdraw(&mut self.ledger, owner, amount)
  }

  fn gauge_balance(&self, owner: &Pubkey) -> u64 {
    self
      .venue
      .gauge
      .as_ref()
      .map_or(0, |gauge| gauge.balance_of(owner))
  }

  fn gauge_get_reward(
    &mut self,
    owner: &Pubkey,
    tokens: &[Pubkey],
  ) -> Result<Vec<(Pubkey, u64)>> {
    let gauge = self.venue.gauge.as_mut().ok_or(NoGauge)?;
    gauge.get_reward(&mut self.ledger, owner, tokens)
  }
}

impl ClVenue for ClChain {
  fn pool_tokens(&self) -> (Pubkey, Pubkey) {
    (self.venue.token0, self.venue.token1)
  }

  fn pool_state(&self) -> ClPoolState {
    self.venue.state()
  }

  fn pool_position(&self, owner: &Pubkey, tick_lower: i32, tick_upper: i32) -> ClPosition {
    self.venue.position(owner, tick_lower, tick_upper)
  }

  fn pool_mint(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
  ) -> Result<(u64, u64)> {
    self
      .venue
      .mint(&mut self.ledger, owner, tick_lower, tick_upper, liquidity)
  }

  fn pool_burn(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
  ) -> Result<(u64, u64)> {
    self.venue.burn(owner, tick_lower, tick_upper, liquidity)
  }

  fn pool_collect(
    &mut self,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    amount0_max: u64,
    amount1_max: u64,
  ) -> Result<(u64, u64)> {
    self.venue.collect(
      &mut self.ledger,
      owner,
      tick_lower,
      tick_upper,
      amount0_max,
      amount1_max,
    )
  }

  fn pool_swap(
    &mut self,
    owner: &Pubkey,
    zero_for_one: bool,
    amount_in: u64,
    sqrt_price_limit_x64: u128,
  ) -> Result<(u64, u64)> {
    self.venue.swap(
      &mut self.ledger,
      owner,
      zero_for_one,
      amount_in,
      sqrt_price_limit_x64,
    )
  }
}
