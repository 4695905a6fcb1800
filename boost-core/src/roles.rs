use crate::error::CoreError::{EnforcedPause, ExpectedPause, MissingRole};
use crate::roles::Role::{
  Amo, Pauser, RewardCollector, Setter, Unpauser, Withdrawer,
};
use crate::venue::Authority;

use anchor_lang::prelude::*;

use std::fmt::Display;

/// Capabilities granted per account by the authorization gate.
#[derive(
  Copy,
  Clone,
  Debug,
  AnchorSerialize,
  AnchorDeserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum Role {
  Setter,
  Amo,
  Withdrawer,
  Pauser,
  Unpauser,
  RewardCollector,
}

impl Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Setter => f.write_str("SETTER_ROLE"),
      Amo => f.write_str("AMO_ROLE"),
      Withdrawer => f.write_str("WITHDRAWER_ROLE"),
      Pauser => f.write_str("PAUSER_ROLE"),
      Unpauser => f.write_str("UNPAUSER_ROLE"),
      RewardCollector => f.write_str("REWARD_COLLECTOR_ROLE"),
    }
  }
}

/// Fails with [`MissingRole`], reporting the account and role as compared
/// values.
pub fn ensure_role(
  authority: &impl Authority,
  role: Role,
  account: &Pubkey,
) -> Result<()> {
  if authority.has_role(role, account) {
    Ok(())
  } else {
    Err(
      anchor_lang::error::Error::from(MissingRole)
        .with_values((account.to_string(), role.to_string())),
    )
  }
}

pub fn ensure_not_paused(authority: &impl Authority) -> Result<()> {
  if authority.paused() {
    Err(EnforcedPause.into())
  } else {
    Ok(())
  }
}

pub fn ensure_paused(authority: &impl Authority) -> Result<()> {
  if authority.paused() {
    Ok(())
  } else {
    Err(ExpectedPause.into())
  }
}
