use crate::error::SimError::{DepositZero, InsufficientStake, InvalidTokenId, NoStake, PoolArithmetic};
use crate::ledger::Ledger;

use anchor_lang::prelude::*;
use boost_core::venue::TokenLedger;

use std::collections::BTreeMap;

/// Staking gauge for a pair's LP token. Each [`Gauge::notify_reward`] is
/// split pro rata over the stakes current at that moment.
#[derive(Clone, Debug)]
pub struct Gauge {
  pub address: Pubkey,
  stake_mint: Pubkey,
  stakes: BTreeMap<Pubkey, u64>,
  total_staked: u64,
  token_ids: BTreeMap<u64, Pubkey>,
  earned: BTreeMap<(Pubkey, Pubkey), u64>,
}

impl Gauge {
  #[must_use]
  pub fn new(stake_mint: Pubkey) -> Gauge {
    Gauge {
      address: Pubkey::new_unique(),
      stake_mint,
      stakes: BTreeMap::new(),
      total_staked: 0,
      token_ids: BTreeMap::new(),
      earned: BTreeMap::new(),
    }
  }

  /// Binds a voting escrow token id to `owner` for boosted deposits.
  pub fn register_token_id(&mut self, token_id: u64, owner: Pubkey) {
    self.token_ids.insert(token_id, owner);
  }

  #[must_use]
  pub fn balance_of(&self, owner: &Pubkey) -> u64 {
    self.stakes.get(owner).copied().unwrap_or(0)
  }

  #[must_use]
  pub fn total_staked(&self) -> u64 {
    self.total_staked
  }

  #[must_use]
  pub fn earned(&self, owner: &Pubkey, token: &Pubkey) -> u64 {
    self.earned.get(&(*owner, *token)).copied().unwrap_or(0)
  }

  pub fn deposit(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    amount: u64,
    token_id: Option<u64>,
  ) -> Result<()> {
    if let Some(id) = token_id {
      if self.token_ids.get(&id) != Some(owner) {
        return Err(InvalidTokenId.into());
      }
    }
    if amount == 0 {
      return Err(DepositZero.into());
    }
    ledger.transfer(&self.stake_mint, owner, &self.address, amount)?;
    let stake = self.stakes.entry(*owner).or_default();
    *stake = stake.checked_add(amount).ok_or(PoolArithmetic)?;
    self.total_staked = self.total_staked.checked_add(amount).ok_or(PoolArithmetic)?;
    Ok(())
  }

  pub fn withdraw(&mut self, ledger: &mut Ledger, owner: &Pubkey, amount: u64) -> Result<()> {
    let stake = self.stakes.entry(*owner).or_default();
    *stake = stake.checked_sub(amount).ok_or(InsufficientStake)?;
    self.total_staked = self.total_staked.checked_sub(amount).ok_or(PoolArithmetic)?;
    ledger.transfer(&self.stake_mint, &self.address, owner, amount)
  }

  /// Pulls `amount` of `token` from `funder` and credits every staker its
  /// share, rounded down.
  pub fn notify_reward(
    &mut self,
    ledger: &mut Ledger,
    funder: &Pubkey,
    token: &Pubkey,
    amount: u64,
  ) -> Result<()> {
    if self.total_staked == 0 {
      return Err(NoStake.into());
    }
    ledger.transfer(token, funder, &self.address, amount)?;
    for (staker, stake) in &self.stakes {
      let share = u128::from(amount) * u128::from(*stake) / u128::from(self.total_staked);
      let share = u64::try_from(share).map_err(|_| PoolArithmetic)?;
      let earned = self.earned.entry((*staker, *token)).or_default();
      *earned = earned.checked_add(share).ok_or(PoolArithmetic)?;
    }
    Ok(())
  }

  /// Pays everything `owner` has earned in each of `tokens`.
  pub fn get_reward(
    &mut self,
    ledger: &mut Ledger,
    owner: &Pubkey,
    tokens: &[Pubkey],
  ) -> Result<Vec<(Pubkey, u64)>> {
    tokens
      .iter()
      .map(|token| {
        let amount = self.earned.remove(&(*owner, *token)).unwrap_or(0);
        if amount > 0 {
          ledger.transfer(token, &self.address, owner, amount)?;
        }
        Ok((*token, amount))
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Setup {
    ledger: Ledger,
    gauge: Gauge,
    lp: Pubkey,
    reward: Pubkey,
  }

  fn setup() -> Result<Setup> {
    let mut ledger = Ledger::new();
    let lp = ledger.create_mint(9);
    let reward = ledger.create_mint(9);
    Ok(Setup {
      gauge: Gauge::new(lp),
      ledger,
      lp,
      reward,
    })
  }

  #[test]
  fn deposit_and_withdraw() -> Result<()> {
    let Setup { mut ledger, mut gauge, lp, .. } = setup()?;
    let alice = Pubkey::new_unique();
    ledger.mint_to(&lp, &alice, 100)?;
    gauge.deposit(&mut ledger, &alice, 60, None)?;
    assert_eq!(gauge.balance_of(&alice), 60);
    assert_eq!(ledger.balance_of(&lp, &alice), 40);
    gauge.withdraw(&mut ledger, &alice, 60)?;
    assert_eq!(ledger.balance_of(&lp, &alice), 100);
    let out = gauge.withdraw(&mut ledger, &alice, 1);
    assert_eq!(out, Err(InsufficientStake.into()));
    Ok(())
  }

  #[test]
  fn token_id_must_belong_to_depositor() -> Result<()> {
    let Setup { mut ledger, mut gauge, lp, .. } = setup()?;
    let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());
    ledger.mint_to(&lp, &alice, 100)?;
    gauge.register_token_id(7, bob);
    let out = gauge.deposit(&mut ledger, &alice, 10, Some(7));
    assert_eq!(out, Err(InvalidTokenId.into()));
    gauge.register_token_id(8, alice);
    gauge.deposit(&mut ledger, &alice, 10, Some(8))?;
    Ok(())
  }

  #[test]
  fn rewards_split_pro_rata() -> Result<()> {
    let Setup { mut ledger, mut gauge, lp, reward } = setup()?;
    let (alice, bob, funder) =
      (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    ledger.mint_to(&lp, &alice, 300)?;
    ledger.mint_to(&lp, &bob, 100)?;
    ledger.mint_to(&reward, &funder, 1_000)?;
    gauge.deposit(&mut ledger, &alice, 300, None)?;
    gauge.deposit(&mut ledger, &bob, 100, None)?;
    gauge.notify_reward(&mut ledger, &funder, &reward, 1_000)?;
    let paid = gauge.get_reward(&mut ledger, &alice, &[reward])?;
    assert_eq!(paid, vec![(reward, 750)]);
    assert_eq!(ledger.balance_of(&reward, &alice), 750);
    let again = gauge.get_reward(&mut ledger, &alice, &[reward])?;
    assert_eq!(again, vec![(reward, 0)]);
    assert_eq!(gauge.earned(&bob, &reward), 250);
    Ok(())
  }

  #[test]
  fn rewards_need_stake() -> Result<()> {
    let Setup { mut ledger, mut gauge, reward, .. } = setup()?;
    let funder = Pubkey::new_unique();
    ledger.mint_to(&reward, &funder, 1_000)?;
    let out = gauge.notify_reward(&mut ledger, &funder, &reward, 1_000);
    assert_eq!(out, Err(NoStake.into()));
    Ok(())
  }
}
