#![allow(clippy::missing_errors_doc)]

pub mod adapter;
pub mod amo;
pub mod config;
pub mod config_store;
pub mod treasury;

pub use adapter::{
  AmoAccount, ConcentratedAdapter, LiquidityFill, PoolAdapter, PositionInfo,
  SolidlyV2Adapter, SwapFill,
};
pub use amo::{
  Amo, ConcentratedAmo, SolidlyV2Amo, UnfarmOutcome, DUST_THRESHOLD,
  PUBLIC_SLIPPAGE_TOLERANCE,
};
pub use config::{AmoConfig, PoolConfig};

use boost_core::clock::SolanaClock;
use boost_core::venue::{Authority, BoostMinter, TokenLedger};

/// Everything an AMO needs from its environment apart from the pool.
/// `Clone` backs the all-or-nothing execution of each entry point.
pub trait Host: TokenLedger + BoostMinter + Authority + SolanaClock + Clone {}

impl<T> Host for T where T: TokenLedger + BoostMinter + Authority + SolanaClock + Clone {}
