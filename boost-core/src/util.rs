/// Narrowing helpers around [`ethnum::U256`] intermediates.
pub mod wide {
  use ethnum::U256;

  #[must_use]
  pub fn u256(value: u64) -> U256 {
    U256::from(value)
  }

  #[must_use]
  pub fn to_u128(value: U256) -> Option<u128> {
    (value <= U256::from(u128::MAX)).then(|| value.as_u128())
  }

  #[must_use]
  pub fn to_u64(value: U256) -> Option<u64> {
    to_u128(value).and_then(|v| u64::try_from(v).ok())
  }

  /// Integer square root, rounded down.
  #[must_use]
  pub fn isqrt(value: U256) -> U256 {
    if value < U256::new(2) {
      return value;
    }
    let mut x = value;
    let mut y = (x >> 1u32) + (x & U256::ONE);
    while y < x {
      x = y;
      y = (x + value / x) >> 1u32;
    }
    x
  }
}

#[cfg(test)]
pub mod proptest {
  use crate::clmm_math::{MAX_TICK, MIN_TICK};
  use proptest::prelude::*;

  use fix::prelude::*;

  #[macro_export]
  macro_rules! eq_tolerance {
    ($l:expr, $r:expr, $tol:expr) => {{
      let diff = $l.bits.abs_diff($r.bits);
      diff <= $tol
    }};
  }

  /// Raw BOOST reserve at 9 decimals, 1k to 100M tokens.
  pub fn boost_reserve() -> BoxedStrategy<u64> {
    (1_000_000_000_000u64..100_000_000_000_000_000)
      .boxed()
  }

  /// Raw USD reserve at 6 decimals, 1k to 100M tokens.
  pub fn usd_reserve() -> BoxedStrategy<u64> {
    (1_000_000_000u64..100_000_000_000_000).boxed()
  }

  pub fn boost_price() -> BoxedStrategy<UFix64<N6>> {
    (500_000u64..2_000_000).prop_map(UFix64::new).boxed()
  }

  pub fn tick() -> BoxedStrategy<i32> {
    (MIN_TICK..=MAX_TICK).boxed()
  }

  pub fn liquidity() -> BoxedStrategy<u128> {
    (1_000_000u128..1_000_000_000_000_000_000).boxed()
  }
}
