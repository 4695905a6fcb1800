use crate::error::CoreError::DecisionArithmetic;
use crate::peg::PegStatus::{Above, Below, Within};
use crate::ratio::{validate_ratio, RatioBound};

use anchor_lang::prelude::*;
use fix::prelude::*;

use std::fmt::Display;

/// Where the BOOST price sits relative to the dead-band around target.
#[derive(
  Copy, Clone, Debug, AnchorSerialize, AnchorDeserialize, PartialEq, Eq,
)]
pub enum PegStatus {
  Below,
  Within,
  Above,
}

impl Display for PegStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Below => f.write_str("Below"),
      Within => f.write_str("Within"),
      Above => f.write_str("Above"),
    }
  }
}

/// Dead-band of `target * (1 ± width)` in which no public correction runs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PegBand {
  pub target: UFix64<N6>,
  pub lower: UFix64<N6>,
  pub upper: UFix64<N6>,
}

impl PegBand {
  /// Derives band edges from target price and relative half-width.
  pub fn new(target: UFix64<N6>, width: UFix64<N6>) -> Result<PegBand> {
    validate_ratio(width, RatioBound::fraction())?;
    let offset = target
      .mul_div_floor(width, UFix64::one())
      .ok_or(DecisionArithmetic)?;
    let lower = target.checked_sub(&offset).ok_or(DecisionArithmetic)?;
    let upper = target.checked_add(&offset).ok_or(DecisionArithmetic)?;
    Ok(PegBand {
      target,
      lower,
      upper,
    })
  }

  /// Strict comparisons, edges belong to the band.
  #[must_use]
  pub fn status(&self, price: UFix64<N6>) -> PegStatus {
    if price > self.upper {
      Above
    } else if price < self.lower {
      Below
    } else {
      Within
    }
  }

  #[must_use]
  pub fn distance(&self, price: UFix64<N6>) -> u64 {
    price.bits.abs_diff(self.target.bits)
  }
}
