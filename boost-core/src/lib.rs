#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod clmm_math;
pub mod clock;
pub mod conversion;
pub mod decision;
pub mod error;
pub mod events;
pub mod pair_math;
pub mod params;
pub mod peg;
pub mod price;
pub mod ratio;
pub mod roles;
pub mod slippage_config;
pub mod snapshot;
pub mod util;
pub mod venue;
