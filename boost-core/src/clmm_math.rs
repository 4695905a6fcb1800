//! Concentrated liquidity math on Q64.64 square root prices.

use crate::error::CoreError::{LiquidityArithmetic, TickOutOfBounds};
use crate::util::wide::{to_u128, to_u64};

use anchor_lang::prelude::*;
use ethnum::U256;

pub const MIN_TICK: i32 = -443_636;
pub const MAX_TICK: i32 = 443_636;
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

/// Fees are quoted in hundredths of a basis point.
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

const Q64_SHIFT: u32 = 64;

/// `sqrt(1.0001)^(2^i)` in Q32.96 for `i` in `1..=18`.
const POSITIVE_FACTORS_X96: [u128; 18] = [
  79_236_085_330_515_764_027_303_304_731,
  79_244_008_939_048_815_603_706_035_061,
  79_259_858_533_276_714_757_314_932_305,
  79_291_567_232_598_584_799_939_703_904,
  79_355_022_692_464_371_645_785_046_466,
  79_482_085_999_252_804_386_437_311_141,
  79_736_823_300_114_093_921_829_183_326,
  80_248_749_790_819_932_309_965_073_892,
  81_282_483_887_344_747_381_513_967_011,
  83_390_072_131_320_151_908_154_831_281,
  87_770_609_709_833_776_024_991_924_138,
  97_234_110_755_111_693_312_479_820_773,
  119_332_217_159_966_728_226_237_229_890,
  179_736_315_981_702_064_433_883_588_727,
  407_748_233_172_238_350_107_850_275_304,
  2_098_478_828_474_011_932_436_660_412_517,
  55_581_415_166_113_811_149_459_800_483_533,
  38_992_368_544_603_139_932_233_054_999_993_551,
];

/// `sqrt(1.0001)^(-2^i)` in Q64.64 for `i` in `1..=18`.
const NEGATIVE_FACTORS_X64: [u128; 18] = [
  18_444_899_583_751_176_498,
  18_443_055_278_223_354_162,
  18_439_367_220_385_604_838,
  18_431_993_317_065_449_817,
  18_417_254_355_718_160_513,
  18_387_811_781_193_591_352,
  18_329_067_761_203_520_168,
  18_212_142_134_806_087_854,
  17_980_523_815_641_551_639,
  17_526_086_738_831_147_013,
  16_651_378_430_235_024_244,
  15_030_750_278_693_429_944,
  12_247_334_978_882_834_399,
  8_131_365_268_884_726_200,
  3_584_323_654_723_342_297,
  696_457_651_847_595_233,
  26_294_789_957_452_057,
  37_481_735_321_082,
];

fn mul_shift_96(n0: u128, n1: u128) -> u128 {
  ((U256::new(n0) * U256::new(n1)) >> 96u32).as_u128()
}

/// Q64.64 square root price at a tick, `sqrt(1.0001^tick) * 2^64`.
pub fn sqrt_price_at_tick(tick: i32) -> Result<u128> {
  if !(MIN_TICK..=MAX_TICK).contains(&tick) {
    return Err(TickOutOfBounds.into());
  }
  let abs_tick = tick.unsigned_abs();
  if tick >= 0 {
    let mut ratio: u128 = if abs_tick & 1 != 0 {
      79_232_123_823_359_799_118_286_999_567
    } else {
      79_228_162_514_264_337_593_543_950_336
    };
    for (bit, factor) in POSITIVE_FACTORS_X96.iter().enumerate() {
      if abs_tick & (2 << bit) != 0 {
        ratio = mul_shift_96(ratio, *factor);
      }
    }
    Ok(ratio >> 32)
  } else {
    let mut ratio: u128 = if abs_tick & 1 != 0 {
      18_445_821_805_675_392_311
    } else {
      18_446_744_073_709_551_616
    };
    for (bit, factor) in NEGATIVE_FACTORS_X64.iter().enumerate() {
      if abs_tick & (2 << bit) != 0 {
        ratio = (ratio * factor) >> Q64_SHIFT;
      }
    }
    Ok(ratio)
  }
}

/// Greatest tick whose square root price does not exceed `sqrt_price_x64`.
pub fn tick_at_sqrt_price(sqrt_price_x64: u128) -> Result<i32> {
  if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
    return Err(TickOutOfBounds.into());
  }
  let (mut lo, mut hi) = (MIN_TICK, MAX_TICK);
  while lo < hi {
    let mid = lo + (hi - lo + 1) / 2;
    if sqrt_price_at_tick(mid)? <= sqrt_price_x64 {
      lo = mid;
    } else {
      hi = mid - 1;
    }
  }
  Ok(lo)
}

fn ordered(sqrt_a: u128, sqrt_b: u128) -> (u128, u128) {
  if sqrt_a > sqrt_b {
    (sqrt_b, sqrt_a)
  } else {
    (sqrt_a, sqrt_b)
  }
}

fn div_round(num: U256, den: U256, round_up: bool) -> U256 {
  let quotient = num / den;
  if round_up && quotient * den != num {
    quotient + U256::ONE
  } else {
    quotient
  }
}

/// Token0 needed to move between two prices at constant liquidity.
///
/// ```text
///   L * (sqrt_b - sqrt_a) * 2^64
///   ────────────────────────────
///        sqrt_b * sqrt_a
/// ```
pub fn amount0_delta(
  sqrt_a: u128,
  sqrt_b: u128,
  liquidity: u128,
  round_up: bool,
) -> Result<u64> {
  let amount = amount0_delta_wide(sqrt_a, sqrt_b, liquidity, round_up)?;
  to_u64(amount).ok_or(LiquidityArithmetic.into())
}

fn amount0_delta_wide(
  sqrt_a: u128,
  sqrt_b: u128,
  liquidity: u128,
  round_up: bool,
) -> Result<U256> {
  let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
  if sqrt_a == 0 {
    return Err(LiquidityArithmetic.into());
  }
  let num = (U256::new(liquidity) << Q64_SHIFT)
    .checked_mul(U256::new(sqrt_b - sqrt_a))
    .ok_or(LiquidityArithmetic)?;
  let step = div_round(num, U256::new(sqrt_b), round_up);
  Ok(div_round(step, U256::new(sqrt_a), round_up))
}

/// Token1 needed to move between two prices at constant liquidity.
///
/// ```text
///   L * (sqrt_b - sqrt_a) / 2^64
/// ```
pub fn amount1_delta(
  sqrt_a: u128,
  sqrt_b: u128,
  liquidity: u128,
  round_up: bool,
) -> Result<u64> {
  let amount = amount1_delta_wide(sqrt_a, sqrt_b, liquidity, round_up);
  to_u64(amount).ok_or(LiquidityArithmetic.into())
}

fn amount1_delta_wide(
  sqrt_a: u128,
  sqrt_b: u128,
  liquidity: u128,
  round_up: bool,
) -> U256 {
  let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
  let num = U256::new(liquidity) * U256::new(sqrt_b - sqrt_a);
  div_round(num, U256::ONE << Q64_SHIFT, round_up)
}

/// Liquidity that `amount0` of token0 buys between two prices.
pub fn liquidity_for_amount0(sqrt_a: u128, sqrt_b: u128, amount0: u64) -> Result<u128> {
  let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
  if sqrt_b == sqrt_a {
    return Err(LiquidityArithmetic.into());
  }
  let intermediate = (U256::new(sqrt_a) * U256::new(sqrt_b)) >> Q64_SHIFT;
  let liquidity = intermediate
    .checked_mul(U256::from(amount0))
    .ok_or(LiquidityArithmetic)?
    / U256::new(sqrt_b - sqrt_a);
  to_u128(liquidity).ok_or(LiquidityArithmetic.into())
}

pub fn liquidity_for_amount1(sqrt_a: u128, sqrt_b: u128, amount1: u64) -> Result<u128> {
  let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
  if sqrt_b == sqrt_a {
    return Err(LiquidityArithmetic.into());
  }
  let liquidity =
    (U256::from(amount1) << Q64_SHIFT) / U256::new(sqrt_b - sqrt_a);
  to_u128(liquidity).ok_or(LiquidityArithmetic.into())
}

/// Largest liquidity a range can take from the given token budgets.
pub fn liquidity_for_amounts(
  sqrt_price: u128,
  sqrt_lower: u128,
  sqrt_upper: u128,
  amount0: u64,
  amount1: u64,
) -> Result<u128> {
  let (sqrt_lower, sqrt_upper) = ordered(sqrt_lower, sqrt_upper);
  if sqrt_price <= sqrt_lower {
    liquidity_for_amount0(sqrt_lower, sqrt_upper, amount0)
  } else if sqrt_price < sqrt_upper {
    let from0 = liquidity_for_amount0(sqrt_price, sqrt_upper, amount0)?;
    let from1 = liquidity_for_amount1(sqrt_lower, sqrt_price, amount1)?;
    Ok(from0.min(from1))
  } else {
    liquidity_for_amount1(sqrt_lower, sqrt_upper, amount1)
  }
}

/// Token amounts represented by `liquidity` in a range at a given price.
pub fn amounts_for_liquidity(
  sqrt_price: u128,
  sqrt_lower: u128,
  sqrt_upper: u128,
  liquidity: u128,
  round_up: bool,
) -> Result<(u64, u64)> {
  let (sqrt_lower, sqrt_upper) = ordered(sqrt_lower, sqrt_upper);
  if sqrt_price <= sqrt_lower {
    Ok((
      amount0_delta(sqrt_lower, sqrt_upper, liquidity, round_up)?,
      0,
    ))
  } else if sqrt_price < sqrt_upper {
    Ok((
      amount0_delta(sqrt_price, sqrt_upper, liquidity, round_up)?,
      amount1_delta(sqrt_lower, sqrt_price, liquidity, round_up)?,
    ))
  } else {
    Ok((
      0,
      amount1_delta(sqrt_lower, sqrt_upper, liquidity, round_up)?,
    ))
  }
}

/// Price after adding `amount_in` of the input token, rounded so the
/// pool never gives away more than it receives.
pub fn next_sqrt_price_from_input(
  sqrt_price: u128,
  liquidity: u128,
  amount_in: u64,
  zero_for_one: bool,
) -> Result<u128> {
  if liquidity == 0 {
    return Err(LiquidityArithmetic.into());
  }
  if amount_in == 0 {
    return Ok(sqrt_price);
  }
  if zero_for_one {
    let numerator = U256::new(liquidity) << Q64_SHIFT;
    let product = U256::from(amount_in) * U256::new(sqrt_price);
    let denominator =
      numerator.checked_add(product).ok_or(LiquidityArithmetic)?;
    let next = div_round(
      numerator
        .checked_mul(U256::new(sqrt_price))
        .ok_or(LiquidityArithmetic)?,
      denominator,
      true,
    );
    to_u128(next).ok_or(LiquidityArithmetic.into())
  } else {
    let delta = (U256::from(amount_in) << Q64_SHIFT) / U256::new(liquidity);
    let next = U256::new(sqrt_price)
      .checked_add(delta)
      .ok_or(LiquidityArithmetic)?;
    to_u128(next).ok_or(LiquidityArithmetic.into())
  }
}

/// One exact-input swap step toward `sqrt_target` inside a single
/// liquidity range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapStep {
  pub sqrt_price_next: u128,
  pub amount_in: u64,
  pub amount_out: u64,
  pub fee_amount: u64,
}

pub fn compute_swap_step(
  sqrt_price: u128,
  sqrt_target: u128,
  liquidity: u128,
  amount_remaining: u64,
  fee_rate: u32,
) -> Result<SwapStep> {
  let zero_for_one = sqrt_price >= sqrt_target;
  let fee_denominator = u128::from(FEE_RATE_DENOMINATOR);
  let remaining_less_fee = u64::try_from(
    u128::from(amount_remaining)
      * (fee_denominator - u128::from(fee_rate))
      / fee_denominator,
  )
  .map_err(|_| LiquidityArithmetic)?;

  // Kept wide: a far target can need more input than a u64 holds, which
  // only means the step stops short of it.
  let amount_in_max = if zero_for_one {
    amount0_delta_wide(sqrt_target, sqrt_price, liquidity, true)?
  } else {
    amount1_delta_wide(sqrt_price, sqrt_target, liquidity, true)
  };
  let sqrt_price_next = if U256::from(remaining_less_fee) >= amount_in_max {
    sqrt_target
  } else {
    next_sqrt_price_from_input(
      sqrt_price,
      liquidity,
      remaining_less_fee,
      zero_for_one,
    )?
  };
  let reached_target = sqrt_price_next == sqrt_target;

  let (amount_in, amount_out) = if zero_for_one {
    let amount_in = if reached_target {
      to_u64(amount_in_max).ok_or(LiquidityArithmetic)?
    } else {
      amount0_delta(sqrt_price_next, sqrt_price, liquidity, true)?
    };
    (
      amount_in,
      amount1_delta(sqrt_price_next, sqrt_price, liquidity, false)?,
    )
  } else {
    let amount_in = if reached_target {
      to_u64(amount_in_max).ok_or(LiquidityArithmetic)?
    } else {
      amount1_delta(sqrt_price, sqrt_price_next, liquidity, true)?
    };
    (
      amount_in,
      amount0_delta(sqrt_price, sqrt_price_next, liquidity, false)?,
    )
  };

  let fee_amount = if reached_target {
    let fee = div_round(
      U256::from(amount_in) * U256::from(fee_rate),
      U256::from(FEE_RATE_DENOMINATOR - fee_rate),
      true,
    );
    to_u64(fee).ok_or(LiquidityArithmetic)?
  } else {
    amount_remaining.saturating_sub(amount_in)
  };

  Ok(SwapStep {
    sqrt_price_next,
    amount_in,
    amount_out,
    fee_amount,
  })
}

/// Gross input whose fee-free part equals `net_amount`, rounded down.
pub fn gross_up_for_fee(net_amount: u64, fee_rate: u32) -> Result<u64> {
  let gross = u128::from(net_amount) * u128::from(FEE_RATE_DENOMINATOR)
    / u128::from(FEE_RATE_DENOMINATOR - fee_rate);
  u64::try_from(gross).map_err(|_| LiquidityArithmetic.into())
}
