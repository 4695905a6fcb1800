mod common;

use anchor_lang::prelude::Pubkey;
use anyhow::Result;
use boost_amo::{AmoConfig, ConcentratedAdapter, ConcentratedAmo, DUST_THRESHOLD};
use boost_core::clmm_math::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_TICK};
use boost_core::error::CoreError::{
  EnforcedPause, InvalidReserveRatio, InvalidSqrtPrice, InvalidTickBounds,
  PositionNotEmpty, SlippageExceeded,
};
use boost_core::events::AmoEvent;
use boost_core::params::{ParamsConfig, PegParameters};
use boost_core::price::peg_sqrt_price_x64;
use boost_core::roles::Role;
use boost_core::venue::{ClVenue, TokenLedger};
use boost_sim::error::SimError::ZeroLiquidity;
use common::{
  assert_missing_role, full_ratios, within, ClContext, DepositsRefused,
  ONE_BOOST, ONE_USD, SCALE,
};

const MILLION_USD: u64 = 1_000_000 * ONE_USD;
const MILLION_BOOST: u64 = 1_000_000 * ONE_BOOST;

#[test]
fn public_mint_sell_farm_restores_peg_from_above() -> Result<()> {
  for usd_first in [true, false] {
    let mut ctx = ClContext::new(usd_first, full_ratios())?;
    ctx.user_buys_boost(MILLION_USD)?;
    assert!(ctx.price()? > 1_010_000);

    let liquidity = ctx.amo.public_mint_sell_farm(&mut ctx.chain)?;
    assert!(within(ctx.price()?, 1_000_000, 10));
    let (boost, usd) = ctx.amo_balances();
    assert_eq!(boost, 0);
    assert!(usd <= DUST_THRESHOLD);
    assert_eq!(
      ctx.amo.position(&ctx.chain)?.liquidity,
      ctx.seeded + liquidity
    );
    assert!(matches!(
      ctx.amo.events(),
      [
        AmoEvent::MintSell { .. },
        AmoEvent::AddLiquidity { .. },
        AmoEvent::PublicMintSellFarmExecuted { .. },
      ]
    ));
  }
  Ok(())
}

#[test]
fn public_unfarm_buy_burn_restores_peg_from_below() -> Result<()> {
  for usd_first in [true, false] {
    let mut ctx = ClContext::new(usd_first, full_ratios())?;
    ctx.user_sells_boost(MILLION_BOOST)?;
    assert!(ctx.price()? < 990_000);

    ctx.amo.public_unfarm_buy_burn(&mut ctx.chain)?;
    assert!(within(ctx.price()?, 1_000_000, 10));
    let (boost, usd) = ctx.amo_balances();
    assert_eq!(boost, 0);
    assert!(usd <= DUST_THRESHOLD);
    // the price-limited buy leaves USD behind, which goes back in the pool
    assert!(matches!(
      ctx.amo.events(),
      [
        AmoEvent::UnfarmBuyBurn { .. },
        AmoEvent::AddLiquidity { .. },
        AmoEvent::PublicUnfarmBuyBurnExecuted { .. },
      ]
    ));
  }
  Ok(())
}

#[test]
fn default_ratios_still_reach_target() -> Result<()> {
  let mut ctx = ClContext::new(false, PegParameters::default())?;
  ctx.user_buys_boost(MILLION_USD)?;
  ctx.amo.public_mint_sell_farm(&mut ctx.chain)?;
  assert!(within(ctx.price()?, 1_000_000, 10));
  assert_eq!(ctx.amo_balances().0, 0);
  Ok(())
}

#[test]
fn public_calls_at_peg_rejected() -> Result<()> {
  let mut ctx = ClContext::new(true, full_ratios())?;
  let state = ctx.chain.pool_state();
  let out = ctx.amo.public_mint_sell_farm(&mut ctx.chain);
  assert_eq!(out, Err(InvalidReserveRatio.into()));
  let out = ctx.amo.public_unfarm_buy_burn(&mut ctx.chain);
  assert_eq!(out, Err(InvalidReserveRatio.into()));
  assert_eq!(ctx.chain.pool_state(), state);
  assert!(ctx.amo.events().is_empty());
  Ok(())
}

#[test]
fn privileged_unfarm_redeploys_leftover_usd() -> Result<()> {
  let mut ctx = ClContext::new(false, full_ratios())?;
  ctx.user_sells_boost(MILLION_BOOST)?;
  let admin = ctx.admin;
  let now = ctx.now();

  let outcome = ctx.amo.unfarm_buy_burn(
    &mut ctx.chain,
    &admin,
    ctx.seeded / 10,
    0,
    0,
    0,
    now,
  )?;
  assert!(within(ctx.price()?, 1_000_000, 10));
  assert!(outcome.usd_redeployed > 0);
  assert_eq!(outcome.boost_burned, outcome.boost_removed + outcome.boost_bought);
  let (boost, usd) = ctx.amo_balances();
  assert_eq!(boost, 0);
  assert!(usd <= DUST_THRESHOLD);
  Ok(())
}

#[test]
fn failed_redeploy_rolls_back_unfarm() -> Result<()> {
  let mut ctx = ClContext::new(false, full_ratios())?;
  ctx.user_sells_boost(MILLION_BOOST)?;
  let admin = ctx.admin;
  let now = ctx.now();
  let mut chain = DepositsRefused(ctx.chain.clone());
  let boost = ctx.chain.boost();
  let supply = ctx.chain.ledger.supply(&boost);

  let out = ctx.amo.unfarm_buy_burn(
    &mut chain,
    &admin,
    ctx.seeded / 10,
    0,
    0,
    0,
    now,
  );
  assert_eq!(out, Err(ZeroLiquidity.into()));
  assert_eq!(chain.0.pool_state(), ctx.chain.pool_state());
  assert_eq!(chain.0.ledger.supply(&boost), supply);
  assert_eq!(chain.0.balance_of(&chain.0.usd_mint, &ctx.amo.id()), 0);
  assert_eq!(ctx.amo.position(&chain)?.liquidity, ctx.seeded);
  assert!(ctx.amo.events().is_empty());
  Ok(())
}

#[test]
fn pause_blocks_every_pool_operation() -> Result<()> {
  let mut ctx = ClContext::new(true, full_ratios())?;
  ctx.user_sells_boost(MILLION_BOOST)?;
  let admin = ctx.admin;
  let now = ctx.now();
  let state = ctx.chain.pool_state();
  ctx.amo.pause(&mut ctx.chain, &admin)?;

  let out = ctx.amo.public_unfarm_buy_burn(&mut ctx.chain);
  assert_eq!(out, Err(EnforcedPause.into()));
  let out = ctx.amo.public_mint_sell_farm(&mut ctx.chain);
  assert_eq!(out, Err(EnforcedPause.into()));
  let out = ctx
    .amo
    .mint_and_sell_boost(&mut ctx.chain, &admin, ONE_BOOST, 0, now);
  assert_eq!(out, Err(EnforcedPause.into()));
  let out = ctx
    .amo
    .add_liquidity(&mut ctx.chain, &admin, ONE_USD, 0, 0, now);
  assert_eq!(out, Err(EnforcedPause.into()));
  let out = ctx
    .amo
    .mint_sell_farm(&mut ctx.chain, &admin, ONE_BOOST, 0, 0, 0, now);
  assert_eq!(out, Err(EnforcedPause.into()));
  let out =
    ctx
      .amo
      .unfarm_buy_burn(&mut ctx.chain, &admin, ctx.seeded / 10, 0, 0, 0, now);
  assert_eq!(out, Err(EnforcedPause.into()));
  assert_eq!(ctx.chain.pool_state(), state);

  ctx.amo.unpause(&mut ctx.chain, &admin)?;
  ctx.amo.public_unfarm_buy_burn(&mut ctx.chain)?;
  assert!(within(ctx.price()?, 1_000_000, 10));
  Ok(())
}

#[test]
fn failed_sale_rolls_back_mint() -> Result<()> {
  let mut ctx = ClContext::new(true, full_ratios())?;
  ctx.user_buys_boost(MILLION_USD)?;
  let admin = ctx.admin;
  let now = ctx.now();
  let boost = ctx.chain.boost();
  let state = ctx.chain.pool_state();
  let supply = ctx.chain.ledger.supply(&boost);

  let out = ctx.amo.mint_and_sell_boost(
    &mut ctx.chain,
    &admin,
    100_000 * ONE_BOOST,
    u64::MAX,
    now,
  );
  assert_eq!(out, Err(SlippageExceeded.into()));
  assert_eq!(ctx.chain.pool_state(), state);
  assert_eq!(ctx.chain.ledger.supply(&boost), supply);
  assert_eq!(ctx.amo_balances(), (0, 0));
  assert!(ctx.amo.events().is_empty());
  Ok(())
}

#[test]
fn sale_stops_at_target_and_burns_the_rest() -> Result<()> {
  let mut ctx = ClContext::new(true, full_ratios())?;
  ctx.user_buys_boost(MILLION_USD)?;
  let admin = ctx.admin;
  let now = ctx.now();
  let boost = ctx.chain.boost();
  let supply = ctx.chain.ledger.supply(&boost);

  let fill = ctx.amo.mint_and_sell_boost(
    &mut ctx.chain,
    &admin,
    5 * MILLION_BOOST,
    0,
    now,
  )?;
  assert!(fill.boost < 5 * MILLION_BOOST);
  assert!(within(ctx.price()?, 1_000_000, 10));
  assert_eq!(ctx.amo_balances(), (0, fill.usd));
  assert_eq!(ctx.chain.ledger.supply(&boost), supply + fill.boost);
  Ok(())
}

#[test]
fn tick_bounds_locked_while_position_open() -> Result<()> {
  let mut ctx = ClContext::new(true, full_ratios())?;
  let admin = ctx.admin;

  let out = ctx.amo.set_tick_bounds(&ctx.chain, &admin, 10, -10);
  assert_eq!(out, Err(InvalidTickBounds.into()));
  let out = ctx.amo.set_tick_bounds(&ctx.chain, &admin, MIN_TICK - 1, 0);
  assert_eq!(out, Err(InvalidTickBounds.into()));
  let out = ctx.amo.set_tick_bounds(&ctx.chain, &admin, -600, 600);
  assert_eq!(out, Err(PositionNotEmpty.into()));
  assert_eq!(ctx.amo.adapter().tick_bounds(), (MIN_TICK, MAX_TICK));

  let stranger = Pubkey::new_unique();
  let out = ctx.amo.set_tick_bounds(&ctx.chain, &stranger, -600, 600);
  assert_missing_role(out, &stranger, Role::Setter);
  assert!(ctx.amo.events().is_empty());
  Ok(())
}

#[test]
fn empty_position_can_move_range() -> Result<()> {
  let ctx = ClContext::new(true, full_ratios())?;
  let boost_is_token0 = ctx.chain.pool_tokens().0 == ctx.chain.boost();
  let id = Pubkey::new_unique();
  let adapter = ConcentratedAdapter::new(
    MIN_TICK,
    MAX_TICK,
    peg_sqrt_price_x64(boost_is_token0, SCALE)?,
  )?;
  let mut amo = ConcentratedAmo::new(
    &ctx.chain,
    id,
    ctx.chain.usd_mint,
    full_ratios(),
    adapter,
  )?;

  amo.set_tick_bounds(&ctx.chain, &ctx.admin, -600, 600)?;
  assert_eq!(amo.adapter().tick_bounds(), (-600, 600));
  assert_eq!(
    amo.events(),
    &[AmoEvent::TickBoundsSet {
      tick_lower: -600,
      tick_upper: 600,
    }]
  );
  Ok(())
}

#[test]
fn target_sqrt_price_must_be_in_range() -> Result<()> {
  let mut ctx = ClContext::new(true, full_ratios())?;
  let admin = ctx.admin;
  let target = ctx.amo.adapter().target_sqrt_price_x64();

  for invalid in [0, MAX_SQRT_PRICE_X64] {
    let out = ctx.amo.set_target_sqrt_price_x64(&ctx.chain, &admin, invalid);
    assert_eq!(out, Err(InvalidSqrtPrice.into()));
  }
  assert_eq!(ctx.amo.adapter().target_sqrt_price_x64(), target);

  ctx
    .amo
    .set_target_sqrt_price_x64(&ctx.chain, &admin, target + 1)?;
  assert_eq!(ctx.amo.adapter().target_sqrt_price_x64(), target + 1);
  Ok(())
}

#[test]
fn reserves_and_position_read_from_pool() -> Result<()> {
  for usd_first in [true, false] {
    let ctx = ClContext::new(usd_first, full_ratios())?;
    let (boost, usd) = ctx.amo.get_reserves(&ctx.chain)?;
    assert!(within(boost, usd, boost / 1_000_000));
    let position = ctx.amo.position(&ctx.chain)?;
    assert_eq!(position.liquidity, ctx.seeded);
    assert!(within(position.boost, 11_000_000 * ONE_BOOST, ONE_BOOST));
    assert!(within(position.usd, 11_000_000 * ONE_USD, ONE_USD));
  }
  Ok(())
}

#[test]
fn amo_built_from_config_targets_peg() -> Result<()> {
  for usd_first in [true, false] {
    let mut ctx = ClContext::new(usd_first, PegParameters::default())?;
    let json = serde_json::json!({
      "amo": ctx.amo.id().to_string(),
      "usd": ctx.chain.usd_mint.to_string(),
      "params": ParamsConfig::from(&full_ratios()),
      "pool": {
        "family": "concentrated",
        "tick_lower": MIN_TICK,
        "tick_upper": MAX_TICK,
      },
    });
    let amo = AmoConfig::from_json(&json.to_string())?
      .build_concentrated(&ctx.chain)?;
    assert_eq!(amo.adapter(), ctx.amo.adapter());
    ctx.amo = amo;

    ctx.user_sells_boost(MILLION_BOOST)?;
    ctx.amo.public_unfarm_buy_burn(&mut ctx.chain)?;
    assert!(within(ctx.price()?, 1_000_000, 10));
    assert_eq!(ctx.amo_balances().0, 0);
  }
  Ok(())
}
