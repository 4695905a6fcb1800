//! Role gated setters. Each validates fully before writing, so a rejected
//! call leaves the stored configuration untouched.

use crate::adapter::concentrated::{validate_sqrt_price, validate_tick_bounds};
use crate::adapter::{ConcentratedAdapter, SolidlyV2Adapter};
use crate::amo::Amo;

use anchor_lang::prelude::*;
use boost_core::error::CoreError::{PositionNotEmpty, ZeroAddress};
use boost_core::events::AmoEvent;
use boost_core::params::{ParamsConfig, PegParameters};
use boost_core::roles::{ensure_role, Role};
use boost_core::venue::{Authority, ClVenue};
use tracing::info;

impl<A: Clone> Amo<A> {
  pub fn set_params<E: Authority>(
    &mut self,
    env: &E,
    caller: &Pubkey,
    config: ParamsConfig,
  ) -> Result<()> {
    ensure_role(env, Role::Setter, caller)?;
    self.params = PegParameters::try_from(config)?;
    info!(?config, "params set");
    self.emit(AmoEvent::ParamsSet(config));
    Ok(())
  }
}

impl Amo<ConcentratedAdapter> {
  /// Moves the AMO's range. Only allowed while its current position is
  /// empty.
  pub fn set_tick_bounds<E: Authority + ClVenue>(
    &mut self,
    env: &E,
    caller: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
  ) -> Result<()> {
    ensure_role(env, Role::Setter, caller)?;
    validate_tick_bounds(tick_lower, tick_upper)?;
    let (current_lower, current_upper) = self.adapter.tick_bounds();
    let position = env.pool_position(&self.account.id, current_lower, current_upper);
    if position.liquidity > 0 || position.tokens_owed_0 > 0 || position.tokens_owed_1 > 0 {
      return Err(PositionNotEmpty.into());
    }
    self.adapter.tick_lower = tick_lower;
    self.adapter.tick_upper = tick_upper;
    info!(tick_lower, tick_upper, "tick bounds set");
    self.emit(AmoEvent::TickBoundsSet {
      tick_lower,
      tick_upper,
    });
    Ok(())
  }

  pub fn set_target_sqrt_price_x64<E: Authority>(
    &mut self,
    env: &E,
    caller: &Pubkey,
    target_sqrt_price_x64: u128,
  ) -> Result<()> {
    ensure_role(env, Role::Setter, caller)?;
    validate_sqrt_price(target_sqrt_price_x64)?;
    self.adapter.target_sqrt_price_x64 = target_sqrt_price_x64;
    info!(%target_sqrt_price_x64, "target sqrt price set");
    self.emit(AmoEvent::TargetSqrtPriceX64Set {
      target_sqrt_price_x64,
    });
    Ok(())
  }
}

impl Amo<SolidlyV2Adapter> {
  pub fn set_vault<E: Authority>(
    &mut self,
    env: &E,
    caller: &Pubkey,
    reward_vault: Pubkey,
  ) -> Result<()> {
    ensure_role(env, Role::Setter, caller)?;
    if reward_vault == Pubkey::default() {
      return Err(ZeroAddress.into());
    }
    self.adapter.reward_vault = reward_vault;
    info!(%reward_vault, "reward vault set");
    self.emit(AmoEvent::VaultSet { reward_vault });
    Ok(())
  }

  pub fn set_token_id<E: Authority>(
    &mut self,
    env: &E,
    caller: &Pubkey,
    token_id: u64,
    use_token_id: bool,
  ) -> Result<()> {
    ensure_role(env, Role::Setter, caller)?;
    self.adapter.token_id = token_id;
    self.adapter.use_token_id = use_token_id;
    info!(token_id, use_token_id, "token id set");
    self.emit(AmoEvent::TokenIdSet {
      token_id,
      use_token_id,
    });
    Ok(())
  }

  /// Adds `tokens` to, or removes them from, the reward whitelist.
  pub fn set_whitelisted_tokens<E: Authority>(
    &mut self,
    env: &E,
    caller: &Pubkey,
    tokens: &[Pubkey],
    is_whitelisted: bool,
  ) -> Result<()> {
    ensure_role(env, Role::Setter, caller)?;
    for token in tokens {
      if is_whitelisted {
        self.adapter.whitelisted_tokens.insert(*token);
      } else {
        self.adapter.whitelisted_tokens.remove(token);
      }
    }
    info!(count = tokens.len(), is_whitelisted, "reward tokens set");
    self.emit(AmoEvent::RewardTokensSet {
      tokens: tokens.to_vec(),
      is_whitelisted,
    });
    Ok(())
  }
}
