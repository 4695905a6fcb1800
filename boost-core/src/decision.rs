use crate::clmm_math::{
  amount0_delta, amount1_delta, amounts_for_liquidity, compute_swap_step,
  gross_up_for_fee, liquidity_for_amount0, liquidity_for_amount1,
  sqrt_price_at_tick,
};
use crate::error::CoreError::{
  DecisionArithmetic, EmptyPool, InvalidReserveRatio,
};
use crate::params::PegParameters;
use crate::peg::{PegBand, PegStatus};
use crate::ratio::{apply_ratio_floor, apply_ratio_floor_u128};
use crate::snapshot::{ClSnapshot, PairSnapshot, PoolSnapshot};

use anchor_lang::prelude::*;
use fix::prelude::*;

/// BOOST to mint and sell, with the USD the sale should return.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MintSellPlan {
  pub boost_amount: u64,
  pub expected_usd_out: u64,
}

/// Liquidity to pull, with the token amounts the removal should return
/// and the BOOST its USD should buy back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnfarmPlan {
  pub liquidity: u128,
  pub expected_boost: u64,
  pub expected_usd: u64,
  pub expected_boost_bought: u64,
}

/// Public mint-sell-farm requires the price above the dead-band and at or
/// above the configured absolute trigger.
pub fn ensure_public_mint_sell(
  price: UFix64<N6>,
  band: &PegBand,
  params: &PegParameters,
) -> Result<()> {
  if band.status(price) == PegStatus::Above
    && price >= params.boost_upper_price_buy
  {
    Ok(())
  } else {
    Err(InvalidReserveRatio.into())
  }
}

/// Public unfarm-buy-burn requires the price below the dead-band and at
/// or below the configured absolute trigger.
pub fn ensure_public_unfarm(
  price: UFix64<N6>,
  band: &PegBand,
  params: &PegParameters,
) -> Result<()> {
  if band.status(price) == PegStatus::Below
    && price <= params.boost_lower_price_sell
  {
    Ok(())
  } else {
    Err(InvalidReserveRatio.into())
  }
}

/// A correction must land strictly closer to target and must not cross
/// the far edge of the dead-band.
pub fn ensure_progress(
  direction: PegStatus,
  before: UFix64<N6>,
  after: UFix64<N6>,
  band: &PegBand,
) -> Result<()> {
  let closer = band.distance(after) < band.distance(before);
  let contained = match direction {
    PegStatus::Above => after >= band.lower,
    PegStatus::Below => after <= band.upper,
    PegStatus::Within => false,
  };
  if closer && contained {
    Ok(())
  } else {
    Err(InvalidReserveRatio.into())
  }
}

/// Largest `x` in `[0, upper]` that `accept` admits, for a predicate that
/// holds at zero and flips at most once.
fn largest_accepted(upper: u64, accept: impl Fn(u64) -> bool) -> u64 {
  if accept(upper) {
    return upper;
  }
  let (mut lo, mut hi) = (0u64, upper);
  while hi - lo > 1 {
    let mid = lo + (hi - lo) / 2;
    if accept(mid) {
      lo = mid;
    } else {
      hi = mid;
    }
  }
  lo
}

/// First order sale bringing a pair back to parity, in BOOST base units.
///
/// ```text
///   usd_reserve - boost_reserve
///   ───────────────────────────
///                2
/// ```
#[must_use]
pub fn pair_sell_estimate(boost_reserve: u64, usd_reserve: u64) -> Option<u64> {
  usd_reserve.checked_sub(boost_reserve).map(|gap| gap / 2)
}

/// LP whose USD share covers `usd_needed`.
///
/// ```text
///   usd_needed * lp_supply
///   ──────────────────────
///        usd_reserve
/// ```
#[must_use]
pub fn liquidity_for_usd(
  usd_needed: u64,
  usd_reserve: u64,
  lp_supply: u64,
) -> Option<u64> {
  if usd_reserve == 0 {
    return None;
  }
  let liquidity =
    u128::from(usd_needed) * u128::from(lp_supply) / u128::from(usd_reserve);
  u64::try_from(liquidity).ok()
}

fn plan_pair_mint_sell(
  pair: &PairSnapshot,
  params: &PegParameters,
) -> Result<MintSellPlan> {
  let target = UFix64::<N6>::one();
  if pair.boost_price()? <= target {
    return Err(InvalidReserveRatio.into());
  }
  let (boost_reserve, usd_reserve) = pair.reserves()?;
  let estimate =
    pair_sell_estimate(boost_reserve, usd_reserve).ok_or(InvalidReserveRatio)?;
  let upper = apply_ratio_floor(estimate, params.boost_multiplier)
    .ok_or(DecisionArithmetic)?;
  let exact = largest_accepted(upper, |amount| {
    matches!(pair.price_after_sell(amount), Ok(price) if price >= target)
  });
  let boost_amount = apply_ratio_floor(exact, params.boost_sell_ratio)
    .ok_or(DecisionArithmetic)?;
  if boost_amount == 0 {
    return Err(InvalidReserveRatio.into());
  }
  Ok(MintSellPlan {
    boost_amount,
    expected_usd_out: pair.sell_output(boost_amount)?,
  })
}

fn plan_pair_unfarm(
  pair: &PairSnapshot,
  params: &PegParameters,
) -> Result<UnfarmPlan> {
  let target = UFix64::<N6>::one();
  if pair.boost_price()? >= target {
    return Err(InvalidReserveRatio.into());
  }
  let (boost_reserve, usd_reserve) = pair.reserves()?;
  let gap =
    pair_sell_estimate(usd_reserve, boost_reserve).ok_or(InvalidReserveRatio)?;
  let usd_needed = pair.scale.boost_to_usd(gap)?;
  let estimate = liquidity_for_usd(usd_needed, pair.reserve_usd, pair.lp_supply)
    .ok_or(DecisionArithmetic)?;
  let upper = apply_ratio_floor(estimate, params.valid_removing_ratio)
    .ok_or(DecisionArithmetic)?
    .min(pair.amo_liquidity);
  let exact = largest_accepted(upper, |liquidity| {
    matches!(pair.price_after_unfarm(liquidity), Ok(price) if price <= target)
  });
  let liquidity = apply_ratio_floor(exact, params.usd_buy_ratio)
    .ok_or(DecisionArithmetic)?;
  if liquidity == 0 {
    return Err(InvalidReserveRatio.into());
  }
  let (expected_boost, expected_usd) = pair.removal(liquidity)?;
  Ok(UnfarmPlan {
    liquidity: u128::from(liquidity),
    expected_boost,
    expected_usd,
    expected_boost_bought: pair.unfarm_swap(liquidity)?.amount_out,
  })
}

/// BOOST trades above target when the pool price sits on the USD-rich
/// side of the target square root price.
fn boost_above_target(pool: &ClSnapshot) -> bool {
  if pool.boost_is_token0 {
    pool.sqrt_price_x64 > pool.target_sqrt_price_x64
  } else {
    pool.sqrt_price_x64 < pool.target_sqrt_price_x64
  }
}

fn boost_below_target(pool: &ClSnapshot) -> bool {
  if pool.boost_is_token0 {
    pool.sqrt_price_x64 < pool.target_sqrt_price_x64
  } else {
    pool.sqrt_price_x64 > pool.target_sqrt_price_x64
  }
}

fn plan_concentrated_mint_sell(
  pool: &ClSnapshot,
  params: &PegParameters,
) -> Result<MintSellPlan> {
  if pool.liquidity == 0 {
    return Err(EmptyPool.into());
  }
  if !boost_above_target(pool) {
    return Err(InvalidReserveRatio.into());
  }
  let (current, target) = (pool.sqrt_price_x64, pool.target_sqrt_price_x64);
  let needed = if pool.boost_is_token0 {
    amount0_delta(target, current, pool.liquidity, true)?
  } else {
    amount1_delta(current, target, pool.liquidity, true)?
  };
  let gross = gross_up_for_fee(needed, pool.fee_rate)?;
  let boost_amount = apply_ratio_floor(gross, params.boost_multiplier)
    .and_then(|amount| apply_ratio_floor(amount, params.usd_usage_ratio))
    .ok_or(DecisionArithmetic)?;
  if boost_amount == 0 {
    return Err(InvalidReserveRatio.into());
  }
  // the swap is limited at target, so only the in-range step fills
  let step = compute_swap_step(
    current,
    target,
    pool.liquidity,
    boost_amount,
    pool.fee_rate,
  )?;
  Ok(MintSellPlan {
    boost_amount,
    expected_usd_out: step.amount_out,
  })
}

fn plan_concentrated_unfarm(
  pool: &ClSnapshot,
  params: &PegParameters,
) -> Result<UnfarmPlan> {
  if pool.liquidity == 0 {
    return Err(EmptyPool.into());
  }
  if !boost_below_target(pool) || pool.position_liquidity == 0 {
    return Err(InvalidReserveRatio.into());
  }
  let (current, target) = (pool.sqrt_price_x64, pool.target_sqrt_price_x64);
  let usd_needed = if pool.boost_is_token0 {
    amount1_delta(current, target, pool.liquidity, true)?
  } else {
    amount0_delta(target, current, pool.liquidity, true)?
  };
  let usd_needed = gross_up_for_fee(usd_needed, pool.fee_rate)
    .ok()
    .and_then(|gross| apply_ratio_floor(gross, params.usd_usage_ratio))
    .ok_or(DecisionArithmetic)?;

  let sqrt_lower = sqrt_price_at_tick(pool.tick_lower)?;
  let sqrt_upper = sqrt_price_at_tick(pool.tick_upper)?;
  // liquidity holding `usd_needed` on the USD side of the range, rounded
  // down; a range with no USD side left has nothing to unfarm
  let holding = if pool.boost_is_token0 {
    if current <= sqrt_lower {
      return Err(InvalidReserveRatio.into());
    }
    liquidity_for_amount1(sqrt_lower, current.min(sqrt_upper), usd_needed)?
  } else {
    if current >= sqrt_upper {
      return Err(InvalidReserveRatio.into());
    }
    liquidity_for_amount0(current.max(sqrt_lower), sqrt_upper, usd_needed)?
  };
  let liquidity = apply_ratio_floor_u128(holding, params.valid_removing_ratio)
    .ok_or(DecisionArithmetic)?
    .min(pool.position_liquidity);
  if liquidity == 0 {
    return Err(InvalidReserveRatio.into());
  }
  let (amount0, amount1) =
    amounts_for_liquidity(current, sqrt_lower, sqrt_upper, liquidity, false)?;
  let (expected_boost, expected_usd) = if pool.boost_is_token0 {
    (amount0, amount1)
  } else {
    (amount1, amount0)
  };
  // the position's share leaves the active liquidity before the buy
  let in_range = sqrt_lower <= current && current < sqrt_upper;
  let remaining = if in_range {
    pool.liquidity.saturating_sub(liquidity)
  } else {
    pool.liquidity
  };
  let expected_boost_bought = if remaining == 0 || expected_usd == 0 {
    0
  } else {
    compute_swap_step(current, target, remaining, expected_usd, pool.fee_rate)?
      .amount_out
  };
  Ok(UnfarmPlan {
    liquidity,
    expected_boost,
    expected_usd,
    expected_boost_bought,
  })
}

/// Sizes a public mint-sell-farm from a fresh pool snapshot.
///   - pairs: search the largest sale not pushing price below target,
///     then apply `boost_sell_ratio`
///   - concentrated: exact delta to target, fee and multipliers applied
pub fn plan_mint_sell(
  snapshot: &PoolSnapshot,
  params: &PegParameters,
) -> Result<MintSellPlan> {
  match snapshot {
    PoolSnapshot::Pair(pair) => plan_pair_mint_sell(pair, params),
    PoolSnapshot::Concentrated(pool) => {
      plan_concentrated_mint_sell(pool, params)
    }
  }
}

/// Sizes a public unfarm-buy-burn from a fresh pool snapshot.
pub fn plan_unfarm_buy_burn(
  snapshot: &PoolSnapshot,
  params: &PegParameters,
) -> Result<UnfarmPlan> {
  match snapshot {
    PoolSnapshot::Pair(pair) => plan_pair_unfarm(pair, params),
    PoolSnapshot::Concentrated(pool) => plan_concentrated_unfarm(pool, params),
  }
}
