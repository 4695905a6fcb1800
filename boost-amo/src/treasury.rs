use crate::adapter::SolidlyV2Adapter;
use crate::amo::Amo;

use anchor_lang::prelude::*;
use boost_core::error::CoreError::{NoGauge, TokenNotWhitelisted, ZeroAddress};
use boost_core::events::AmoEvent;
use boost_core::roles::{ensure_not_paused, ensure_role, Role};
use boost_core::venue::{Authority, PairVenue, TokenLedger};
use tracing::info;

impl<A: Clone> Amo<A> {
  /// Moves `amount` of any token the AMO holds to `to`. Available while
  /// paused.
  pub fn withdraw_erc20<E: Authority + TokenLedger>(
    &mut self,
    env: &mut E,
    caller: &Pubkey,
    token: &Pubkey,
    amount: u64,
    to: &Pubkey,
  ) -> Result<()> {
    ensure_role(&*env, Role::Withdrawer, caller)?;
    if *to == Pubkey::default() {
      return Err(ZeroAddress.into());
    }
    env.transfer(token, &self.account.id, to, amount)?;
    info!(%token, amount, %to, "withdrawn");
    Ok(())
  }
}

impl Amo<SolidlyV2Adapter> {
  /// Claims gauge rewards and forwards them to the reward vault. With
  /// `claim_all` every whitelisted token is claimed. Returns the amount
  /// claimed per token.
  pub fn get_reward<E: Authority + PairVenue + TokenLedger + Clone>(
    &mut self,
    env: &mut E,
    caller: &Pubkey,
    tokens: &[Pubkey],
    claim_all: bool,
  ) -> Result<Vec<u64>> {
    ensure_not_paused(&*env)?;
    ensure_role(&*env, Role::RewardCollector, caller)?;
    if let Some(token) = tokens.iter().find(|t| !self.adapter.is_whitelisted(t)) {
      return Err(
        anchor_lang::error::Error::from(TokenNotWhitelisted)
          .with_pubkeys((*token, self.account.id)),
      );
    }
    if !env.has_gauge() {
      return Err(NoGauge.into());
    }
    let vault = self.adapter.reward_vault();
    if vault == Pubkey::default() {
      return Err(ZeroAddress.into());
    }
    let claimed_tokens = if claim_all {
      self.adapter.whitelisted_tokens()
    } else {
      tokens.to_vec()
    };
    self.transact(env, |amo, env| {
      let id = amo.account.id;
      let claimed = env.gauge_get_reward(&id, &claimed_tokens)?;
      for (token, amount) in &claimed {
        if *amount > 0 {
          env.transfer(token, &id, &vault, *amount)?;
        }
      }
      let amounts: Vec<u64> = claimed.iter().map(|(_, amount)| *amount).collect();
      info!(?amounts, %vault, "rewards collected");
      amo.emit(AmoEvent::GetReward {
        tokens: claimed_tokens.clone(),
        amounts: amounts.clone(),
      });
      Ok(amounts)
    })
  }
}
