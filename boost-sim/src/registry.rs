use boost_core::roles::Role;
use boost_core::venue::Authority;

use anchor_lang::prelude::*;

use std::collections::BTreeSet;

/// Role grants plus the pause flag.
#[derive(Clone, Debug, Default)]
pub struct RoleRegistry {
  grants: BTreeSet<(Role, Pubkey)>,
  paused: bool,
}

impl RoleRegistry {
  #[must_use]
  pub fn new() -> RoleRegistry {
    RoleRegistry::default()
  }

  pub fn grant(&mut self, role: Role, account: Pubkey) {
    self.grants.insert((role, account));
  }

  pub fn revoke(&mut self, role: Role, account: &Pubkey) {
    self.grants.remove(&(role, *account));
  }

  /// Grants every role to `admin`.
  pub fn grant_all(&mut self, admin: Pubkey) {
    for role in [
      Role::Setter,
      Role::Amo,
      Role::Withdrawer,
      Role::Pauser,
      Role::Unpauser,
      Role::RewardCollector,
    ] {
      self.grant(role, admin);
    }
  }
}

impl Authority for RoleRegistry {
  fn has_role(&self, role: Role, account: &Pubkey) -> bool {
    self.grants.contains(&(role, *account))
  }

  fn paused(&self) -> bool {
    self.paused
  }

  fn set_paused(&mut self, paused: bool) {
    self.paused = paused;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn grants_are_per_role() {
    let mut registry = RoleRegistry::new();
    let account = Pubkey::new_unique();
    registry.grant(Role::Amo, account);
    assert!(registry.has_role(Role::Amo, &account));
    assert!(!registry.has_role(Role::Setter, &account));
    registry.revoke(Role::Amo, &account);
    assert!(!registry.has_role(Role::Amo, &account));
  }

  #[test]
  fn grant_all_covers_every_role() {
    let mut registry = RoleRegistry::new();
    let admin = Pubkey::new_unique();
    registry.grant_all(admin);
    assert!(registry.has_role(Role::RewardCollector, &admin));
    assert!(registry.has_role(Role::Unpauser, &admin));
  }
}
