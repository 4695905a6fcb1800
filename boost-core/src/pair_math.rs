//! Solidly style pair curves: volatile `x * y = k` and stable
//! `x^3 * y + x * y^3 = k`, both evaluated on reserves normalized to 18
//! decimals exactly like the on-chain pair contracts.

use crate::conversion::pow10;
use crate::error::CoreError::{PairArithmetic, StableCurveConvergence};
use crate::util::wide::{to_u64, u256};

use anchor_lang::prelude::*;
use ethnum::U256;
use fix::prelude::*;
use serde::{Deserialize, Serialize};

/// LP units permanently locked by the first deposit.
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Fee denominator, fees are quoted in basis points.
pub const FEE_DENOMINATOR: u64 = 10_000;

const NEWTON_ITERATIONS: usize = 255;

fn one_e18() -> U256 {
  U256::new(1_000_000_000_000_000_000)
}

#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AnchorSerialize,
  AnchorDeserialize,
)]
pub enum PairKind {
  Volatile,
  Stable,
}

/// Result of swapping against pair reserves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
  pub amount_out: u64,
  pub fee: u64,
  pub reserve_in: u64,
  pub reserve_out: u64,
}

/// Invariant and fee of a pair, shared by the pool and by the AMO's
/// decision math so both see the same numbers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PairCurve {
  pub kind: PairKind,
  pub fee_bps: u16,
}

impl PairCurve {
  #[must_use]
  pub fn new(kind: PairKind, fee_bps: u16) -> PairCurve {
    PairCurve { kind, fee_bps }
  }

  /// Fee withheld from an input amount, rounded down.
  #[must_use]
  pub fn fee(&self, amount_in: u64) -> u64 {
    let fee = u128::from(amount_in) * u128::from(self.fee_bps)
      / u128::from(FEE_DENOMINATOR);
    // fee_bps never exceeds the denominator in practice, saturate anyway
    u64::try_from(fee).unwrap_or(amount_in)
  }

  /// Output of swapping `amount_in` gross of fee.
  pub fn amount_out(
    &self,
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    decimals_in: u8,
    decimals_out: u8,
  ) -> Result<u64> {
    let net_in = amount_in.saturating_sub(self.fee(amount_in));
    match self.kind {
      PairKind::Volatile => volatile_out(net_in, reserve_in, reserve_out),
      PairKind::Stable => stable_out(
        net_in,
        reserve_in,
        reserve_out,
        decimals_in,
        decimals_out,
      ),
    }
  }

  /// Applies a swap to reserves. The fee leaves the pool, only the net
  /// input is added to the input reserve.
  pub fn swap(
    &self,
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    decimals_in: u8,
    decimals_out: u8,
  ) -> Result<SwapOutcome> {
    let fee = self.fee(amount_in);
    let amount_out = self.amount_out(
      amount_in,
      reserve_in,
      reserve_out,
      decimals_in,
      decimals_out,
    )?;
    let reserve_in = reserve_in
      .checked_add(amount_in - fee)
      .ok_or(PairArithmetic)?;
    let reserve_out =
      reserve_out.checked_sub(amount_out).ok_or(PairArithmetic)?;
    Ok(SwapOutcome {
      amount_out,
      fee,
      reserve_in,
      reserve_out,
    })
  }

  /// Marginal price of `base` denominated in `quote`, in `1e6` units.
  ///
  /// ```text
  ///   volatile:  r
  ///   stable:    (3r + r^3) / (1 + 3r^2)
  ///   where r = quote / base on decimal-normalized reserves
  /// ```
  pub fn spot_price(
    &self,
    reserve_base: u64,
    reserve_quote: u64,
    decimals_base: u8,
    decimals_quote: u8,
  ) -> Result<UFix64<N6>> {
    let one = one_e18();
    let r = normalized_ratio(
      reserve_base,
      reserve_quote,
      decimals_base,
      decimals_quote,
    )?;
    let price = match self.kind {
      PairKind::Volatile => r,
      PairKind::Stable => {
        let r2 = r.checked_mul(r).ok_or(PairArithmetic)? / one;
        let r3 = r2.checked_mul(r).ok_or(PairArithmetic)? / one;
        let num = (r * U256::new(3)).checked_add(r3).ok_or(PairArithmetic)?;
        let den = one.checked_add(r2 * U256::new(3)).ok_or(PairArithmetic)?;
        num.checked_mul(one).ok_or(PairArithmetic)? / den
      }
    };
    let bits = price / U256::new(1_000_000_000_000);
    to_u64(bits).map(UFix64::new).ok_or(PairArithmetic.into())
  }
}

/// `quote / base` as an 18 decimal fixed point, decimals normalized.
fn normalized_ratio(
  reserve_base: u64,
  reserve_quote: u64,
  decimals_base: u8,
  decimals_quote: u8,
) -> Result<U256> {
  if reserve_base == 0 {
    return Err(PairArithmetic.into());
  }
  let base_scale = pow10(decimals_base).ok_or(PairArithmetic)?;
  let quote_scale = pow10(decimals_quote).ok_or(PairArithmetic)?;
  let num = u256(reserve_quote)
    .checked_mul(U256::new(base_scale))
    .and_then(|n| n.checked_mul(one_e18()))
    .ok_or(PairArithmetic)?;
  let den = u256(reserve_base)
    .checked_mul(U256::new(quote_scale))
    .ok_or(PairArithmetic)?;
  Ok(num / den)
}

fn volatile_out(net_in: u64, reserve_in: u64, reserve_out: u64) -> Result<u64> {
  let num = u128::from(net_in) * u128::from(reserve_out);
  let den = u128::from(reserve_in) + u128::from(net_in);
  if den == 0 {
    return Err(PairArithmetic.into());
  }
  u64::try_from(num / den).map_err(|_| PairArithmetic.into())
}

fn normalize(amount: u64, decimals: u8) -> Result<U256> {
  let scale = pow10(decimals).ok_or(PairArithmetic)?;
  Ok(u256(amount) * one_e18() / U256::new(scale))
}

fn denormalize(amount: U256, decimals: u8) -> Result<u64> {
  let scale = pow10(decimals).ok_or(PairArithmetic)?;
  let raw = amount.checked_mul(U256::new(scale)).ok_or(PairArithmetic)?
    / one_e18();
  to_u64(raw).ok_or(PairArithmetic.into())
}

/// Stable invariant on normalized reserves.
///
/// ```text
///   k = x * y * (x^2 + y^2)
/// ```
fn stable_k(x: U256, y: U256) -> Result<U256> {
  let one = one_e18();
  let a = x.checked_mul(y).ok_or(PairArithmetic)? / one;
  let b = (x.checked_mul(x).ok_or(PairArithmetic)? / one)
    .checked_add(y.checked_mul(y).ok_or(PairArithmetic)? / one)
    .ok_or(PairArithmetic)?;
  Ok(a.checked_mul(b).ok_or(PairArithmetic)? / one)
}

fn stable_f(x0: U256, y: U256) -> Result<U256> {
  let one = one_e18();
  let y3 = (y.checked_mul(y).ok_or(PairArithmetic)? / one)
    .checked_mul(y)
    .ok_or(PairArithmetic)?
    / one;
  let x3 = (x0.checked_mul(x0).ok_or(PairArithmetic)? / one)
    .checked_mul(x0)
    .ok_or(PairArithmetic)?
    / one;
  let left = x0.checked_mul(y3).ok_or(PairArithmetic)? / one;
  let right = x3.checked_mul(y).ok_or(PairArithmetic)? / one;
  left.checked_add(right).ok_or(PairArithmetic.into())
}

/// Derivative of [`stable_f`] with respect to `y`.
fn stable_d(x0: U256, y: U256) -> Result<U256> {
  let one = one_e18();
  let y2 = y.checked_mul(y).ok_or(PairArithmetic)? / one;
  let left = x0
    .checked_mul(U256::new(3))
    .and_then(|t| t.checked_mul(y2))
    .ok_or(PairArithmetic)?
    / one;
  let x3 = (x0.checked_mul(x0).ok_or(PairArithmetic)? / one)
    .checked_mul(x0)
    .ok_or(PairArithmetic)?
    / one;
  left.checked_add(x3).ok_or(PairArithmetic.into())
}

/// Newton iteration for `y` such that `f(x0, y) = xy`.
fn stable_get_y(x0: U256, xy: U256, mut y: U256) -> Result<U256> {
  let one = one_e18();
  for _ in 0..NEWTON_ITERATIONS {
    let y_prev = y;
    let k = stable_f(x0, y)?;
    let d = stable_d(x0, y)?;
    if d == U256::ZERO {
      return Err(StableCurveConvergence.into());
    }
    if k < xy {
      let dy = (xy - k).checked_mul(one).ok_or(PairArithmetic)? / d;
      y = y.checked_add(dy).ok_or(PairArithmetic)?;
    } else {
      let dy = (k - xy).checked_mul(one).ok_or(PairArithmetic)? / d;
      y = y.checked_sub(dy).ok_or(StableCurveConvergence)?;
    }
    let step = if y > y_prev { y - y_prev } else { y_prev - y };
    if step <= U256::ONE {
      return Ok(y);
    }
  }
  Ok(y)
}

fn stable_out(
  net_in: u64,
  reserve_in: u64,
  reserve_out: u64,
  decimals_in: u8,
  decimals_out: u8,
) -> Result<u64> {
  let x = normalize(reserve_in, decimals_in)?;
  let y = normalize(reserve_out, decimals_out)?;
  let xy = stable_k(x, y)?;
  let x_after = x
    .checked_add(normalize(net_in, decimals_in)?)
    .ok_or(PairArithmetic)?;
  let y_after = stable_get_y(x_after, xy, y)?;
  let out = if y_after >= y { U256::ZERO } else { y - y_after };
  denormalize(out, decimals_out)
}

/// `amount_a` of one side matched at current reserves by the other side.
pub fn quote(amount_a: u64, reserve_a: u64, reserve_b: u64) -> Result<u64> {
  if reserve_a == 0 {
    return Err(PairArithmetic.into());
  }
  let out = u128::from(amount_a) * u128::from(reserve_b) / u128::from(reserve_a);
  u64::try_from(out).map_err(|_| PairArithmetic.into())
}

/// Share of a reserve redeemed by burning `liquidity` out of `supply`.
pub fn share_of_reserve(liquidity: u64, reserve: u64, supply: u64) -> Result<u64> {
  if supply == 0 {
    return Err(PairArithmetic.into());
  }
  let out = u128::from(liquidity) * u128::from(reserve) / u128::from(supply);
  u64::try_from(out).map_err(|_| PairArithmetic.into())
}
