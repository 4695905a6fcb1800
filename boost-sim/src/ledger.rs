use crate::error::SimError::{BalanceOverflow, InsufficientBalance, UnknownMint};

use anchor_lang::prelude::*;
use boost_core::venue::TokenLedger;

use std::collections::BTreeMap;

/// In-memory token balances keyed by `(mint, owner)`.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
  decimals: BTreeMap<Pubkey, u8>,
  balances: BTreeMap<(Pubkey, Pubkey), u64>,
  supply: BTreeMap<Pubkey, u64>,
}

impl Ledger {
  #[must_use]
  pub fn new() -> Ledger {
    Ledger::default()
  }

  /// Registers a fresh mint and returns its address.
  pub fn create_mint(&mut self, decimals: u8) -> Pubkey {
    let mint = Pubkey::new_unique();
    self.decimals.insert(mint, decimals);
    mint
  }

  fn ensure_mint(&self, mint: &Pubkey) -> Result<()> {
    if self.decimals.contains_key(mint) {
      Ok(())
    } else {
      Err(UnknownMint.into())
    }
  }

  fn credit(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<()> {
    let balance = self.balances.entry((*mint, *owner)).or_default();
    *balance = balance.checked_add(amount).ok_or(BalanceOverflow)?;
    Ok(())
  }

  fn debit(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<()> {
    let balance = self.balances.entry((*mint, *owner)).or_default();
    *balance = balance.checked_sub(amount).ok_or(InsufficientBalance)?;
    Ok(())
  }

  pub fn mint_to(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<()> {
    self.ensure_mint(mint)?;
    let supply = self.supply.entry(*mint).or_default();
    *supply = supply.checked_add(amount).ok_or(BalanceOverflow)?;
    self.credit(mint, owner, amount)
  }

  pub fn burn_from(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<()> {
    self.ensure_mint(mint)?;
    self.debit(mint, owner, amount)?;
    let supply = self.supply.entry(*mint).or_default();
    *supply = supply.checked_sub(amount).ok_or(InsufficientBalance)?;
    Ok(())
  }

  #[must_use]
  pub fn supply(&self, mint: &Pubkey) -> u64 {
    self.supply.get(mint).copied().unwrap_or(0)
  }
}

impl TokenLedger for Ledger {
  fn decimals(&self, mint: &Pubkey) -> Result<u8> {
    self.decimals.get(mint).copied().ok_or(UnknownMint.into())
  }

  fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
    self.balances.get(&(*mint, *owner)).copied().unwrap_or(0)
  }

  fn transfer(
    &mut self,
    mint: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u64,
  ) -> Result<()> {
    self.ensure_mint(mint)?;
    self.debit(mint, from, amount)?;
    self.credit(mint, to, amount)
  }
}
