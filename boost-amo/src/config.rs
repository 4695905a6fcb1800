//! Deployment description loaded from JSON.
//!
//! ```json
//! {
//!   "amo": "<pubkey>",
//!   "usd": "<pubkey>",
//!   "params": { "boost_multiplier": 1100000, ... },
//!   "pool": { "family": "concentrated", "tick_lower": -887, "tick_upper": 887 }
//! }
//! ```

use crate::adapter::{ConcentratedAdapter, SolidlyV2Adapter};
use crate::amo::{Amo, ConcentratedAmo, SolidlyV2Amo};

use anchor_lang::prelude::Pubkey;
use anyhow::{anyhow, Context, Result};
use boost_core::conversion::TokenScale;
use boost_core::params::{ParamsConfig, PegParameters};
use boost_core::price::peg_sqrt_price_x64;
use boost_core::venue::{BoostMinter, ClVenue, TokenLedger};
use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;
use std::str::FromStr;

fn parse_pubkey(value: &str) -> Result<Pubkey> {
  Pubkey::from_str(value).map_err(|e| anyhow!("invalid pubkey {value}: {e}"))
}

/// Pool family settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum PoolConfig {
  SolidlyV2 {
    reward_vault: String,
    #[serde(default)]
    token_id: u64,
    #[serde(default)]
    use_token_id: bool,
    #[serde(default)]
    whitelisted_tokens: Vec<String>,
  },
  Concentrated {
    tick_lower: i32,
    tick_upper: i32,
    /// Decimal string; defaults to the peg in the pool's token order.
    #[serde(default)]
    target_sqrt_price_x64: Option<String>,
  },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmoConfig {
  pub amo: String,
  pub usd: String,
  #[serde(default)]
  pub params: ParamsConfig,
  pub pool: PoolConfig,
}

impl AmoConfig {
  /// Parses and validates a configuration document.
  pub fn from_json(json: &str) -> Result<AmoConfig> {
    let config: AmoConfig =
      serde_json::from_str(json).context("malformed AMO configuration")?;
    config.peg_parameters()?;
    config.amo_id()?;
    config.usd_mint()?;
    Ok(config)
  }

  pub fn peg_parameters(&self) -> Result<PegParameters> {
    PegParameters::try_from(self.params)
      .map_err(|e| anyhow!("invalid peg parameters: {e}"))
  }

  pub fn amo_id(&self) -> Result<Pubkey> {
    parse_pubkey(&self.amo)
  }

  pub fn usd_mint(&self) -> Result<Pubkey> {
    parse_pubkey(&self.usd)
  }

  pub fn solidly_adapter(&self) -> Result<SolidlyV2Adapter> {
    let PoolConfig::SolidlyV2 {
      reward_vault,
      token_id,
      use_token_id,
      whitelisted_tokens,
    } = &self.pool
    else {
      return Err(anyhow!("pool family is not solidly_v2"));
    };
    Ok(SolidlyV2Adapter {
      reward_vault: parse_pubkey(reward_vault)?,
      token_id: *token_id,
      use_token_id: *use_token_id,
      whitelisted_tokens: whitelisted_tokens
        .iter()
        .map(|token| parse_pubkey(token))
        .collect::<Result<BTreeSet<_>>>()?,
    })
  }

  pub fn concentrated_adapter(
    &self,
    boost_is_token0: bool,
    scale: TokenScale,
  ) -> Result<ConcentratedAdapter> {
    let PoolConfig::Concentrated {
      tick_lower,
      tick_upper,
      target_sqrt_price_x64,
    } = &self.pool
    else {
      return Err(anyhow!("pool family is not concentrated"));
    };
    let target = match target_sqrt_price_x64 {
      Some(value) => u128::from_str(value)
        .with_context(|| format!("invalid target sqrt price {value}"))?,
      None => peg_sqrt_price_x64(boost_is_token0, scale)
        .map_err(|e| anyhow!("cannot compute peg sqrt price: {e}"))?,
    };
    ConcentratedAdapter::new(*tick_lower, *tick_upper, target)
      .map_err(|e| anyhow!("invalid concentrated pool settings: {e}"))
  }

  pub fn build_solidly<E: TokenLedger + BoostMinter>(
    &self,
    env: &E,
  ) -> Result<SolidlyV2Amo> {
    Amo::new(
      env,
      self.amo_id()?,
      self.usd_mint()?,
      self.peg_parameters()?,
      self.solidly_adapter()?,
    )
    .map_err(|e| anyhow!("cannot build AMO: {e}"))
  }

  /// Token order and decimals are read from `env` to place the default
  /// target at peg.
  pub fn build_concentrated<E: TokenLedger + BoostMinter + ClVenue>(
    &self,
    env: &E,
  ) -> Result<ConcentratedAmo> {
    let boost = env.boost_mint();
    let usd = self.usd_mint()?;
    let decimals = |mint: &Pubkey| {
      env
        .decimals(mint)
        .map_err(|e| anyhow!("unknown mint {mint}: {e}"))
    };
    let scale = TokenScale::new(decimals(&boost)?, decimals(&usd)?);
    let adapter =
      self.concentrated_adapter(env.pool_tokens().0 == boost, scale)?;
    Amo::new(env, self.amo_id()?, usd, self.peg_parameters()?, adapter)
      .map_err(|e| anyhow!("cannot build AMO: {e}"))
  }
}
