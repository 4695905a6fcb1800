use crate::params::ParamsConfig;

use anchor_lang::prelude::*;

/// Record of every state change an AMO performs, in emission order.
#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum AmoEvent {
  MintSell {
    boost_amount_in: u64,
    usd_amount_out: u64,
  },
  AddLiquidity {
    boost_spent: u64,
    usd_spent: u64,
    liquidity: u128,
  },
  AddLiquidityAndDeposit {
    boost_spent: u64,
    usd_spent: u64,
    liquidity: u64,
    token_id: Option<u64>,
  },
  UnfarmBuyBurn {
    liquidity: u128,
    boost_removed: u64,
    usd_removed: u64,
    boost_bought: u64,
    boost_burned: u64,
  },
  PublicMintSellFarmExecuted {
    liquidity: u128,
    new_boost_price: u64,
  },
  PublicUnfarmBuyBurnExecuted {
    liquidity: u128,
    new_boost_price: u64,
  },
  ParamsSet(ParamsConfig),
  TickBoundsSet {
    tick_lower: i32,
    tick_upper: i32,
  },
  TargetSqrtPriceX64Set {
    target_sqrt_price_x64: u128,
  },
  VaultSet {
    reward_vault: Pubkey,
  },
  TokenIdSet {
    token_id: u64,
    use_token_id: bool,
  },
  RewardTokensSet {
    tokens: Vec<Pubkey>,
    is_whitelisted: bool,
  },
  GetReward {
    tokens: Vec<Pubkey>,
    amounts: Vec<u64>,
  },
  Paused {
    account: Pubkey,
  },
  Unpaused {
    account: Pubkey,
  },
}
