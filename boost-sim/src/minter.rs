use crate::error::SimError::{BurnZero, MintZero, MinterRoleMissing};
use crate::ledger::Ledger;

use anchor_lang::prelude::*;

use std::collections::BTreeSet;

/// BOOST issuer. Only serves accounts holding its AMO role; any BOOST such
/// an account holds can be burned, wherever it came from.
#[derive(Clone, Debug)]
pub struct Minter {
  mint: Pubkey,
  amo_accounts: BTreeSet<Pubkey>,
}

impl Minter {
  #[must_use]
  pub fn new(mint: Pubkey) -> Minter {
    Minter {
      mint,
      amo_accounts: BTreeSet::new(),
    }
  }

  #[must_use]
  pub fn mint(&self) -> Pubkey {
    self.mint
  }

  pub fn grant_amo(&mut self, account: Pubkey) {
    self.amo_accounts.insert(account);
  }

  pub fn revoke_amo(&mut self, account: &Pubkey) {
    self.amo_accounts.remove(account);
  }

  fn ensure_amo(&self, caller: &Pubkey) -> Result<()> {
    if self.amo_accounts.contains(caller) {
      Ok(())
    } else {
      Err(MinterRoleMissing.into())
    }
  }

  /// Issues new BOOST to `to`.
  ///
  /// # Errors
  /// * Caller lacks the AMO role
  /// * Zero amount
  /// * Supply overflow
  pub fn protocol_mint(
    &mut self,
    ledger: &mut Ledger,
    caller: &Pubkey,
    to: &Pubkey,
    amount: u64,
  ) -> Result<()> {
    self.ensure_amo(caller)?;
    if amount == 0 {
      return Err(MintZero.into());
    }
    ledger.mint_to(&self.mint, to, amount)
  }

  /// Destroys BOOST held by `from`.
  ///
  /// # Errors
  /// * Caller lacks the AMO role
  /// * Zero amount
  /// * `from` holds less than `amount`
  pub fn protocol_burn(
    &mut self,
    ledger: &mut Ledger,
    caller: &Pubkey,
    from: &Pubkey,
    amount: u64,
  ) -> Result<()> {
    self.ensure_amo(caller)?;
    if amount == 0 {
      return Err(BurnZero.into());
    }
    ledger.burn_from(&self.mint, from, amount)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::SimError::InsufficientBalance;
  use boost_core::venue::TokenLedger;

  fn setup() -> (Ledger, Minter, Pubkey) {
    let mut ledger = Ledger::new();
    let mut minter = Minter::new(ledger.create_mint(9));
    let amo = Pubkey::new_unique();
    minter.grant_amo(amo);
    (ledger, minter, amo)
  }

  #[test]
  fn mint_then_burn_tracks_supply() -> Result<()> {
    let (mut ledger, mut minter, amo) = setup();
    minter.protocol_mint(&mut ledger, &amo, &amo, 1_000)?;
    minter.protocol_burn(&mut ledger, &amo, &amo, 400)?;
    assert_eq!(ledger.supply(&minter.mint()), 600);
    assert_eq!(ledger.balance_of(&minter.mint(), &amo), 600);
    Ok(())
  }

  #[test]
  fn mint_zero_rejected() {
    let (mut ledger, mut minter, amo) = setup();
    let out = minter.protocol_mint(&mut ledger, &amo, &amo, 0);
    assert_eq!(out, Err(MintZero.into()));
  }

  #[test]
  fn burns_boost_bought_on_the_market() -> Result<()> {
    let (mut ledger, mut minter, amo) = setup();
    let boost = minter.mint();
    minter.protocol_mint(&mut ledger, &amo, &amo, 10)?;
    ledger.mint_to(&boost, &amo, 90)?;
    minter.protocol_burn(&mut ledger, &amo, &amo, 100)?;
    assert_eq!(ledger.supply(&boost), 0);
    let out = minter.protocol_burn(&mut ledger, &amo, &amo, 1);
    assert_eq!(out, Err(InsufficientBalance.into()));
    Ok(())
  }

  #[test]
  fn caller_without_role_rejected() -> Result<()> {
    let (mut ledger, mut minter, amo) = setup();
    minter.revoke_amo(&amo);
    let out = minter.protocol_mint(&mut ledger, &amo, &amo, 10);
    assert_eq!(out, Err(MinterRoleMissing.into()));
    Ok(())
  }
}
