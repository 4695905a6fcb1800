use crate::error::CoreError::DeadlineExpired;

use anchor_lang::prelude::*;

/// Abstracts the concept of Solana's onchain clock.
pub trait SolanaClock {
  fn slot(&self) -> u64;
  fn epoch(&self) -> u64;
  fn unix_timestamp(&self) -> i64;
}

impl SolanaClock for Clock {
  fn slot(&self) -> u64 {
    self.slot
  }

  fn epoch(&self) -> u64 {
    self.epoch
  }

  fn unix_timestamp(&self) -> i64 {
    self.unix_timestamp
  }
}

/// Rejects calls landing after their caller-supplied deadline.
pub fn ensure_before_deadline(
  clock: &impl SolanaClock,
  deadline: i64,
) -> Result<()> {
  if clock.unix_timestamp() <= deadline {
    Ok(())
  } else {
    Err(DeadlineExpired.into())
  }
}
