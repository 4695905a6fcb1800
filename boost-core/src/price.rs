use crate::conversion::{pow10, TokenScale};
use crate::error::CoreError::{EmptyPool, PriceArithmetic};
use crate::pair_math::PairCurve;
use crate::util::wide::{isqrt, to_u128, to_u64, u256};

use anchor_lang::prelude::*;
use ethnum::U256;
use fix::prelude::*;

fn price_one() -> U256 {
  U256::new(1_000_000)
}

/// BOOST price on a pair, in USD with `1e6` bits per dollar.
pub fn pair_boost_price(
  curve: &PairCurve,
  reserve_boost: u64,
  reserve_usd: u64,
  scale: TokenScale,
) -> Result<UFix64<N6>> {
  if reserve_boost == 0 || reserve_usd == 0 {
    return Err(EmptyPool.into());
  }
  curve.spot_price(
    reserve_boost,
    reserve_usd,
    scale.boost_decimals,
    scale.usd_decimals,
  )
}

/// BOOST price implied by a Q64.64 square root price.
///
/// ```text
///   raw  = sqrtP^2 / 2^128               (token1 per token0, base units)
///   BOOST token0:  raw * 10^boost_dec / 10^usd_dec
///   BOOST token1:  10^boost_dec / (raw * 10^usd_dec)
/// ```
pub fn sqrt_price_to_boost_price(
  sqrt_price_x64: u128,
  boost_is_token0: bool,
  scale: TokenScale,
) -> Result<UFix64<N6>> {
  if sqrt_price_x64 == 0 {
    return Err(EmptyPool.into());
  }
  let boost_scale = U256::new(pow10(scale.boost_decimals).ok_or(PriceArithmetic)?);
  let usd_scale = U256::new(pow10(scale.usd_decimals).ok_or(PriceArithmetic)?);
  let squared = U256::new(sqrt_price_x64) * U256::new(sqrt_price_x64);
  let q128 = U256::ONE << 128u32;
  let (num, den) = if boost_is_token0 {
    (
      squared.checked_mul(boost_scale),
      q128.checked_mul(usd_scale),
    )
  } else {
    (
      q128.checked_mul(boost_scale),
      squared.checked_mul(usd_scale),
    )
  };
  let num = num
    .and_then(|n| n.checked_mul(price_one()))
    .ok_or(PriceArithmetic)?;
  let den = den.ok_or(PriceArithmetic)?;
  to_u64(num / den)
    .map(UFix64::new)
    .ok_or(PriceArithmetic.into())
}

/// Q64.64 square root price at which BOOST trades at `price`, the inverse
/// of [`sqrt_price_to_boost_price`] rounded down.
pub fn boost_price_to_sqrt_price(
  price: UFix64<N6>,
  boost_is_token0: bool,
  scale: TokenScale,
) -> Result<u128> {
  if price == UFix64::zero() {
    return Err(PriceArithmetic.into());
  }
  let boost_scale = U256::new(pow10(scale.boost_decimals).ok_or(PriceArithmetic)?);
  let usd_scale = U256::new(pow10(scale.usd_decimals).ok_or(PriceArithmetic)?);
  let q128 = U256::ONE << 128u32;
  let (num, den) = if boost_is_token0 {
    (
      u256(price.bits)
        .checked_mul(q128)
        .and_then(|n| n.checked_mul(usd_scale)),
      price_one().checked_mul(boost_scale),
    )
  } else {
    (
      q128
        .checked_mul(boost_scale)
        .and_then(|n| n.checked_mul(price_one())),
      u256(price.bits).checked_mul(usd_scale),
    )
  };
  let squared = num.ok_or(PriceArithmetic)? / den.ok_or(PriceArithmetic)?;
  to_u128(isqrt(squared)).ok_or(PriceArithmetic.into())
}

/// Square root price of the peg in a pool's native format.
pub fn peg_sqrt_price_x64(boost_is_token0: bool, scale: TokenScale) -> Result<u128> {
  boost_price_to_sqrt_price(UFix64::one(), boost_is_token0, scale)
}
