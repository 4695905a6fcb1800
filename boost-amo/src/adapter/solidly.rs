use super::{AmoAccount, LiquidityFill, PoolAdapter, PositionInfo, SwapFill};

use anchor_lang::prelude::*;
use boost_core::error::CoreError::MathOverflow;
use boost_core::events::AmoEvent;
use boost_core::snapshot::{PairSnapshot, PoolSnapshot};
use boost_core::venue::{PairVenue, TokenLedger};

use std::collections::BTreeSet;

/// Drives a Solidly style pair through its router, staking LP in the
/// pair's gauge when one exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolidlyV2Adapter {
  pub(crate) reward_vault: Pubkey,
  pub(crate) token_id: u64,
  pub(crate) use_token_id: bool,
  pub(crate) whitelisted_tokens: BTreeSet<Pubkey>,
}

impl SolidlyV2Adapter {
  #[must_use]
  pub fn new(reward_vault: Pubkey) -> SolidlyV2Adapter {
    SolidlyV2Adapter {
      reward_vault,
      ..SolidlyV2Adapter::default()
    }
  }

  #[must_use]
  pub fn reward_vault(&self) -> Pubkey {
    self.reward_vault
  }

  /// Voting escrow token id attached to gauge deposits, if enabled.
  #[must_use]
  pub fn deposit_token_id(&self) -> Option<u64> {
    self.use_token_id.then_some(self.token_id)
  }

  #[must_use]
  pub fn is_whitelisted(&self, token: &Pubkey) -> bool {
    self.whitelisted_tokens.contains(token)
  }

  #[must_use]
  pub fn whitelisted_tokens(&self) -> Vec<Pubkey> {
    self.whitelisted_tokens.iter().copied().collect()
  }

  /// LP amounts are u64 on a pair, so wider liquidity is an overflow.
  fn deposit_event(&self, fill: &LiquidityFill) -> Result<AmoEvent> {
    Ok(AmoEvent::AddLiquidityAndDeposit {
      boost_spent: fill.boost,
      usd_spent: fill.usd,
      liquidity: u64::try_from(fill.liquidity).map_err(|_| MathOverflow)?,
      token_id: self.deposit_token_id(),
    })
  }

  fn pair_snapshot<E: PairVenue + TokenLedger>(
    env: &E,
    account: &AmoAccount,
  ) -> Result<PairSnapshot> {
    let (token0, _) = env.pair_tokens();
    let (reserve0, reserve1) = env.pair_reserves();
    let (reserve_boost, reserve_usd) = if token0 == account.boost {
      (reserve0, reserve1)
    } else {
      (reserve1, reserve0)
    };
    let amo_liquidity = env
      .balance_of(&env.lp_mint(), &account.id)
      .checked_add(env.gauge_balance(&account.id))
      .ok_or(MathOverflow)?;
    Ok(PairSnapshot {
      curve: env.pair_curve(),
      reserve_boost,
      reserve_usd,
      scale: account.scale,
      lp_supply: env.lp_total_supply(),
      amo_liquidity,
    })
  }
}

impl<E: PairVenue + TokenLedger> PoolAdapter<E> for SolidlyV2Adapter {
  fn snapshot(&self, env: &E, account: &AmoAccount) -> Result<PoolSnapshot> {
    Self::pair_snapshot(env, account).map(PoolSnapshot::Pair)
  }

  fn sell_boost(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    boost_amount: u64,
    min_usd_out: u64,
    deadline: i64,
  ) -> Result<SwapFill> {
    let usd = env.swap_exact_tokens_for_tokens(
      &account.id,
      &account.boost,
      boost_amount,
      min_usd_out,
      deadline,
    )?;
    Ok(SwapFill {
      boost: boost_amount,
      usd,
    })
  }

  fn buy_boost(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    usd_amount: u64,
    min_boost_out: u64,
    deadline: i64,
  ) -> Result<SwapFill> {
    let boost = env.swap_exact_tokens_for_tokens(
      &account.id,
      &account.usd,
      usd_amount,
      min_boost_out,
      deadline,
    )?;
    Ok(SwapFill {
      boost,
      usd: usd_amount,
    })
  }

  fn add_liquidity(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    boost_amount: u64,
    usd_amount: u64,
    min_boost_spent: u64,
    min_usd_spent: u64,
    deadline: i64,
  ) -> Result<LiquidityFill> {
    let (boost, usd, liquidity) = env.add_liquidity(
      &account.id,
      &account.boost,
      &account.usd,
      boost_amount,
      usd_amount,
      min_boost_spent,
      min_usd_spent,
      deadline,
    )?;
    if env.has_gauge() {
      env.gauge_deposit(&account.id, liquidity, self.deposit_token_id())?;
    }
    Ok(LiquidityFill {
      boost,
      usd,
      liquidity: u128::from(liquidity),
    })
  }

  fn quote_add_liquidity(
    &self,
    env: &E,
    account: &AmoAccount,
    boost_amount: u64,
    usd_amount: u64,
  ) -> Result<(u64, u64)> {
    Self::pair_snapshot(env, account)?.deposit_amounts(boost_amount, usd_amount)
  }

  fn remove_liquidity(
    &mut self,
    env: &mut E,
    account: &AmoAccount,
    liquidity: u128,
    min_boost_removed: u64,
    min_usd_removed: u64,
    deadline: i64,
  ) -> Result<LiquidityFill> {
    let lp = u64::try_from(liquidity).map_err(|_| MathOverflow)?;
    let in_wallet = env.balance_of(&env.lp_mint(), &account.id);
    if in_wallet < lp {
      env.gauge_withdraw(&account.id, lp - in_wallet)?;
    }
    let (boost, usd) = env.remove_liquidity(
      &account.id,
      &account.boost,
      &account.usd,
      lp,
      min_boost_removed,
      min_usd_removed,
      deadline,
    )?;
    Ok(LiquidityFill {
      boost,
      usd,
      liquidity,
    })
  }

  fn position(&self, env: &E, account: &AmoAccount) -> Result<PositionInfo> {
    let pair = Self::pair_snapshot(env, account)?;
    if pair.amo_liquidity == 0 {
      return Ok(PositionInfo::default());
    }
    let (boost, usd) = pair.removal(pair.amo_liquidity)?;
    Ok(PositionInfo {
      liquidity: u128::from(pair.amo_liquidity),
      boost,
      usd,
    })
  }

  fn liquidity_event(&self, fill: &LiquidityFill) -> Result<AmoEvent> {
    self.deposit_event(fill)
  }
}
