use boost_core::clock::SolanaClock;

/// Manually advanced clock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SimClock {
  pub slot: u64,
  pub epoch: u64,
  pub unix_timestamp: i64,
}

impl SimClock {
  #[must_use]
  pub fn at(unix_timestamp: i64) -> SimClock {
    SimClock {
      unix_timestamp,
      ..SimClock::default()
    }
  }

  /// Moves time forward, one slot per 400ms.
  pub fn advance(&mut self, seconds: i64) {
    self.unix_timestamp += seconds;
    self.slot += u64::try_from(seconds.max(0) * 5 / 2).unwrap_or(0);
  }
}

impl SolanaClock for SimClock {
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
