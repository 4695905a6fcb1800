use crate::adapter::{
  AmoAccount, ConcentratedAdapter, LiquidityFill, PoolAdapter, PositionInfo,
  SolidlyV2Adapter, SwapFill,
};
use crate::Host;

use anchor_lang::prelude::*;
use boost_core::clock::ensure_before_deadline;
use boost_core::conversion::TokenScale;
use boost_core::decision::{
  ensure_progress, ensure_public_mint_sell, ensure_public_unfarm,
  plan_mint_sell, plan_unfarm_buy_burn,
};
use boost_core::error::CoreError::{
  MathOverflow, UnfavorableExecution, ZeroAddress,
};
use boost_core::events::AmoEvent;
use boost_core::params::PegParameters;
use boost_core::peg::{PegBand, PegStatus};
use boost_core::ratio::apply_ratio_floor;
use boost_core::roles::{ensure_not_paused, ensure_paused, ensure_role, Role};
use boost_core::slippage_config::SlippageConfig;
use boost_core::venue::{Authority, BoostMinter, TokenLedger};
use fix::prelude::*;
use tracing::{debug, info};

/// USD base units a concentrated AMO may keep after an operation, left
/// over from liquidity rounding.
pub const DUST_THRESHOLD: u64 = 1_000;

/// Shortfall public entry points tolerate against their own simulation.
pub const PUBLIC_SLIPPAGE_TOLERANCE: UFix64<N4> = UFix64::constant(50);

pub type SolidlyV2Amo = Amo<SolidlyV2Adapter>;
pub type ConcentratedAmo = Amo<ConcentratedAdapter>;

/// Token flows of one unfarm-buy-burn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UnfarmOutcome {
  pub liquidity: u128,
  pub boost_removed: u64,
  pub usd_removed: u64,
  pub boost_bought: u64,
  pub boost_burned: u64,
  pub usd_redeployed: u64,
}

/// Floors on the removal and the buy-back of one unfarm.
#[derive(Copy, Clone, Debug)]
struct UnfarmMinimums {
  boost_removed: u64,
  usd_removed: u64,
  boost_out: u64,
}

/// Peg keeper for one BOOST/USD pool.
#[derive(Clone, Debug)]
pub struct Amo<A> {
  pub(crate) account: AmoAccount,
  pub(crate) params: PegParameters,
  pub(crate) adapter: A,
  pub(crate) events: Vec<AmoEvent>,
}

/// Pause first, then role, then deadline.
fn guard<E: Host>(
  env: &E,
  caller: &Pubkey,
  role: Role,
  deadline: i64,
) -> Result<()> {
  ensure_not_paused(env)?;
  ensure_role(env, role, caller)?;
  ensure_before_deadline(env, deadline)
}

impl<A: Clone> Amo<A> {
  /// AMO holding its tokens at `id`, trading BOOST against `usd`.
  ///
  /// # Errors
  /// * Zero address for `id` or `usd`
  /// * Out of bound parameters
  /// * Unknown token decimals
  pub fn new<E: TokenLedger + BoostMinter>(
    env: &E,
    id: Pubkey,
    usd: Pubkey,
    params: PegParameters,
    adapter: A,
  ) -> Result<Amo<A>> {
    if id == Pubkey::default() || usd == Pubkey::default() {
      return Err(ZeroAddress.into());
    }
    params.validate()?;
    let boost = env.boost_mint();
    let scale = TokenScale::new(env.decimals(&boost)?, env.decimals(&usd)?);
    Ok(Amo {
      account: AmoAccount {
        id,
        boost,
        usd,
        scale,
      },
      params,
      adapter,
      events: Vec::new(),
    })
  }

  #[must_use]
  pub fn id(&self) -> Pubkey {
    self.account.id
  }

  #[must_use]
  pub fn account(&self) -> AmoAccount {
    self.account
  }

  #[must_use]
  pub fn params(&self) -> PegParameters {
    self.params
  }

  #[must_use]
  pub fn adapter(&self) -> &A {
    &self.adapter
  }

  /// Every event emitted so far, oldest first.
  #[must_use]
  pub fn events(&self) -> &[AmoEvent] {
    &self.events
  }

  pub(crate) fn emit(&mut self, event: AmoEvent) {
    self.events.push(event);
  }

  /// Runs `op` all-or-nothing: on error both the AMO and its environment
  /// are restored to their state before the call.
  pub(crate) fn transact<E: Clone, T>(
    &mut self,
    env: &mut E,
    op: impl FnOnce(&mut Self, &mut E) -> Result<T>,
  ) -> Result<T> {
    let checkpoint = (self.clone(), env.clone());
    let out = op(self, env);
    if out.is_err() {
      (*self, *env) = checkpoint;
    }
    out
  }

  pub fn pause<E: Authority>(&mut self, env: &mut E, caller: &Pubkey) -> Result<()> {
    ensure_role(&*env, Role::Pauser, caller)?;
    ensure_not_paused(&*env)?;
    env.set_paused(true);
    info!(%caller, "amo paused");
    self.emit(AmoEvent::Paused { account: *caller });
    Ok(())
  }

  pub fn unpause<E: Authority>(&mut self, env: &mut E, caller: &Pubkey) -> Result<()> {
    ensure_role(&*env, Role::Unpauser, caller)?;
    ensure_paused(&*env)?;
    env.set_paused(false);
    info!(%caller, "amo unpaused");
    self.emit(AmoEvent::Unpaused { account: *caller });
    Ok(())
  }

  pub fn boost_price<E>(&self, env: &E) -> Result<UFix64<N6>>
  where
    A: PoolAdapter<E>,
  {
    self.adapter.snapshot(env, &self.account)?.boost_price()
  }

  /// `(boost, usd)` reserves normalized to BOOST decimals.
  pub fn get_reserves<E>(&self, env: &E) -> Result<(u64, u64)>
  where
    A: PoolAdapter<E>,
  {
    self.adapter.snapshot(env, &self.account)?.reserves()
  }

  pub fn position<E>(&self, env: &E) -> Result<PositionInfo>
  where
    A: PoolAdapter<E>,
  {
    self.adapter.position(env, &self.account)
  }

  /// Mints `boost_amount` and sells it for at least `min_usd_out`, never
  /// below peg. Whatever the pool does not take is burned.
  pub fn mint_and_sell_boost<E>(
    &mut self,
    env: &mut E,
    caller: &Pubkey,
    boost_amount: u64,
    min_usd_out: u64,
    deadline: i64,
  ) -> Result<SwapFill>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    guard(&*env, caller, Role::Amo, deadline)?;
    self.transact(env, |amo, env| {
      amo.mint_and_sell(env, boost_amount, min_usd_out, deadline)
    })
  }

  /// Pairs `usd_amount` with freshly minted BOOST as liquidity.
  pub fn add_liquidity<E>(
    &mut self,
    env: &mut E,
    caller: &Pubkey,
    usd_amount: u64,
    min_boost_spent: u64,
    min_usd_spent: u64,
    deadline: i64,
  ) -> Result<LiquidityFill>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    guard(&*env, caller, Role::Amo, deadline)?;
    self.transact(env, |amo, env| {
      amo.provide(env, usd_amount, min_boost_spent, min_usd_spent, deadline)
    })
  }

  /// Mint and sell, then farm every dollar received.
  #[allow(clippy::too_many_arguments)]
  pub fn mint_sell_farm<E>(
    &mut self,
    env: &mut E,
    caller: &Pubkey,
    boost_amount: u64,
    min_usd_out: u64,
    min_boost_spent: u64,
    min_usd_spent: u64,
    deadline: i64,
  ) -> Result<LiquidityFill>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    guard(&*env, caller, Role::Amo, deadline)?;
    self.transact(env, |amo, env| {
      let sale = amo.mint_and_sell(env, boost_amount, min_usd_out, deadline)?;
      amo.provide(env, sale.usd, min_boost_spent, min_usd_spent, deadline)
    })
  }

  /// Pulls `liquidity`, buys BOOST with the USD it returned and burns all
  /// BOOST received.
  #[allow(clippy::too_many_arguments)]
  pub fn unfarm_buy_burn<E>(
    &mut self,
    env: &mut E,
    caller: &Pubkey,
    liquidity: u128,
    min_boost_removed: u64,
    min_usd_removed: u64,
    min_boost_out: u64,
    deadline: i64,
  ) -> Result<UnfarmOutcome>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    guard(&*env, caller, Role::Amo, deadline)?;
    let minimums = UnfarmMinimums {
      boost_removed: min_boost_removed,
      usd_removed: min_usd_removed,
      boost_out: min_boost_out,
    };
    self.transact(env, |amo, env| amo.unfarm(env, liquidity, minimums, deadline))
  }

  /// Permissionless correction while BOOST trades above the band. Sizes
  /// the sale itself and returns the liquidity farmed.
  pub fn public_mint_sell_farm<E>(&mut self, env: &mut E) -> Result<u128>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    ensure_not_paused(&*env)?;
    self.transact(env, |amo, env| amo.public_farm(env))
  }

  /// Permissionless correction while BOOST trades below the band. Returns
  /// the liquidity unfarmed.
  pub fn public_unfarm_buy_burn<E>(&mut self, env: &mut E) -> Result<u128>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    ensure_not_paused(&*env)?;
    self.transact(env, |amo, env| amo.public_unfarm(env))
  }

  fn mint_and_sell<E>(
    &mut self,
    env: &mut E,
    boost_amount: u64,
    min_usd_out: u64,
    deadline: i64,
  ) -> Result<SwapFill>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    let account = self.account;
    env.protocol_mint(&account.id, &account.id, boost_amount)?;
    let fill = self.adapter.sell_boost(
      env,
      &account,
      boost_amount,
      min_usd_out,
      deadline,
    )?;
    if !account.scale.sold_at_or_above_peg(fill.boost, fill.usd)? {
      return Err(UnfavorableExecution.into());
    }
    let unsold = boost_amount.checked_sub(fill.boost).ok_or(MathOverflow)?;
    if unsold > 0 {
      env.protocol_burn(&account.id, &account.id, unsold)?;
    }
    info!(boost_in = fill.boost, usd_out = fill.usd, unsold, "mint and sell");
    self.emit(AmoEvent::MintSell {
      boost_amount_in: fill.boost,
      usd_amount_out: fill.usd,
    });
    Ok(fill)
  }

  fn provide<E>(
    &mut self,
    env: &mut E,
    usd_amount: u64,
    min_boost_spent: u64,
    min_usd_spent: u64,
    deadline: i64,
  ) -> Result<LiquidityFill>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    let account = self.account;
    let boost_amount = self.boost_budget(usd_amount)?;
    env.protocol_mint(&account.id, &account.id, boost_amount)?;
    let fill = self.adapter.add_liquidity(
      env,
      &account,
      boost_amount,
      usd_amount,
      min_boost_spent,
      min_usd_spent,
      deadline,
    )?;
    let unused = boost_amount.checked_sub(fill.boost).ok_or(MathOverflow)?;
    if unused > 0 {
      env.protocol_burn(&account.id, &account.id, unused)?;
    }
    info!(
      boost_spent = fill.boost,
      usd_spent = fill.usd,
      liquidity = %fill.liquidity,
      "liquidity added"
    );
    let event = self.adapter.liquidity_event(&fill)?;
    self.emit(event);
    Ok(fill)
  }

  /// BOOST minted to pair with `usd_amount`: its value at peg widened by
  /// `boost_multiplier`.
  fn boost_budget(&self, usd_amount: u64) -> Result<u64> {
    let at_peg = self.account.scale.usd_to_boost(usd_amount)?;
    apply_ratio_floor(at_peg, self.params.boost_multiplier)
      .ok_or(MathOverflow.into())
  }

  /// Deposits `usd_amount` with spend minimums taken off the pool's own
  /// quote at [`PUBLIC_SLIPPAGE_TOLERANCE`].
  fn provide_quoted<E>(
    &mut self,
    env: &mut E,
    usd_amount: u64,
    deadline: i64,
  ) -> Result<LiquidityFill>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    let boost_amount = self.boost_budget(usd_amount)?;
    let (boost_quote, usd_quote) = self.adapter.quote_add_liquidity(
      env,
      &self.account,
      boost_amount,
      usd_amount,
    )?;
    let min_boost_spent =
      SlippageConfig::new(boost_quote, PUBLIC_SLIPPAGE_TOLERANCE).min_token_out()?;
    let min_usd_spent =
      SlippageConfig::new(usd_quote, PUBLIC_SLIPPAGE_TOLERANCE).min_token_out()?;
    self.provide(env, usd_amount, min_boost_spent, min_usd_spent, deadline)
  }

  fn unfarm<E>(
    &mut self,
    env: &mut E,
    liquidity: u128,
    minimums: UnfarmMinimums,
    deadline: i64,
  ) -> Result<UnfarmOutcome>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    let account = self.account;
    let removed = self.adapter.remove_liquidity(
      env,
      &account,
      liquidity,
      minimums.boost_removed,
      minimums.usd_removed,
      deadline,
    )?;
    let bought = if removed.usd > 0 {
      self.adapter.buy_boost(
        env,
        &account,
        removed.usd,
        minimums.boost_out,
        deadline,
      )?
    } else {
      SwapFill::default()
    };
    if bought.usd > 0
      && !account.scale.bought_at_or_below_peg(bought.usd, bought.boost)?
    {
      return Err(UnfavorableExecution.into());
    }
    let boost_burned = removed
      .boost
      .checked_add(bought.boost)
      .ok_or(MathOverflow)?;
    if boost_burned > 0 {
      env.protocol_burn(&account.id, &account.id, boost_burned)?;
    }
    info!(
      liquidity = %removed.liquidity,
      boost_removed = removed.boost,
      usd_removed = removed.usd,
      boost_bought = bought.boost,
      boost_burned,
      "unfarm buy burn"
    );
    self.emit(AmoEvent::UnfarmBuyBurn {
      liquidity: removed.liquidity,
      boost_removed: removed.boost,
      usd_removed: removed.usd,
      boost_bought: bought.boost,
      boost_burned,
    });
    let leftover = removed.usd.checked_sub(bought.usd).ok_or(MathOverflow)?;
    let usd_redeployed = if leftover > DUST_THRESHOLD {
      self.provide_quoted(env, leftover, deadline)?.usd
    } else {
      0
    };
    Ok(UnfarmOutcome {
      liquidity: removed.liquidity,
      boost_removed: removed.boost,
      usd_removed: removed.usd,
      boost_bought: bought.boost,
      boost_burned,
      usd_redeployed,
    })
  }

  fn band(&self, target: UFix64<N6>) -> Result<PegBand> {
    PegBand::new(target, self.params.valid_range_width)
  }

  fn public_farm<E>(&mut self, env: &mut E) -> Result<u128>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    let account = self.account;
    let snapshot = self.adapter.snapshot(env, &account)?;
    let price = snapshot.boost_price()?;
    let band = self.band(snapshot.target_price()?)?;
    if let Err(error) = ensure_public_mint_sell(price, &band, &self.params) {
      debug!(price = price.bits, status = %band.status(price), "public mint sell farm rejected");
      return Err(error);
    }
    let plan = plan_mint_sell(&snapshot, &self.params)?;
    let min_usd_out =
      SlippageConfig::new(plan.expected_usd_out, PUBLIC_SLIPPAGE_TOLERANCE)
        .min_token_out()?;
    let deadline = env.unix_timestamp();
    let sale = self.mint_and_sell(env, plan.boost_amount, min_usd_out, deadline)?;
    let fill = self.provide_quoted(env, sale.usd, deadline)?;
    let after = self.adapter.snapshot(env, &account)?.boost_price()?;
    ensure_progress(PegStatus::Above, price, after, &band)?;
    info!(
      price_before = price.bits,
      price_after = after.bits,
      liquidity = %fill.liquidity,
      "public mint sell farm"
    );
    self.emit(AmoEvent::PublicMintSellFarmExecuted {
      liquidity: fill.liquidity,
      new_boost_price: after.bits,
    });
    Ok(fill.liquidity)
  }

  fn public_unfarm<E>(&mut self, env: &mut E) -> Result<u128>
  where
    E: Host,
    A: PoolAdapter<E>,
  {
    let account = self.account;
    let snapshot = self.adapter.snapshot(env, &account)?;
    let price = snapshot.boost_price()?;
    let band = self.band(snapshot.target_price()?)?;
    if let Err(error) = ensure_public_unfarm(price, &band, &self.params) {
      debug!(price = price.bits, status = %band.status(price), "public unfarm buy burn rejected");
      return Err(error);
    }
    let plan = plan_unfarm_buy_burn(&snapshot, &self.params)?;
    let min_boost =
      SlippageConfig::new(plan.expected_boost, PUBLIC_SLIPPAGE_TOLERANCE)
        .min_token_out()?;
    let min_usd =
      SlippageConfig::new(plan.expected_usd, PUBLIC_SLIPPAGE_TOLERANCE)
        .min_token_out()?;
    let min_boost_out = SlippageConfig::new(
      plan.expected_boost_bought,
      PUBLIC_SLIPPAGE_TOLERANCE,
    )
    .min_token_out()?;
    let minimums = UnfarmMinimums {
      boost_removed: min_boost,
      usd_removed: min_usd,
      boost_out: min_boost_out,
    };
    let deadline = env.unix_timestamp();
    let outcome = self.unfarm(env, plan.liquidity, minimums, deadline)?;
    let after = self.adapter.snapshot(env, &account)?.boost_price()?;
    ensure_progress(PegStatus::Below, price, after, &band)?;
    info!(
      price_before = price.bits,
      price_after = after.bits,
      liquidity = %outcome.liquidity,
      "public unfarm buy burn"
    );
    self.emit(AmoEvent::PublicUnfarmBuyBurnExecuted {
      liquidity: outcome.liquidity,
      new_boost_price: after.bits,
    });
    Ok(outcome.liquidity)
  }
}
