#![allow(clippy::missing_errors_doc)]

pub mod chain;
pub mod cl_pool;
pub mod clock;
pub mod error;
pub mod gauge;
pub mod ledger;
pub mod minter;
pub mod pair;
pub mod registry;

pub use chain::{Chain, ClChain, PairChain, SolidlyVenue};
