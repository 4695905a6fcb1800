use anchor_lang::prelude::error_code;

#[error_code]
pub enum CoreError {
  // `ratio` and `params`
  #[msg("Ratio value is outside of its allowed bound.")]
  InvalidRatioValue = 7000,
  // `config`
  #[msg("Tick bounds must satisfy MIN_TICK <= lower < upper <= MAX_TICK.")]
  InvalidTickBounds,
  #[msg("Square root price is outside of the valid range.")]
  InvalidSqrtPrice,
  #[msg("Position must be empty before its range can change.")]
  PositionNotEmpty,
  #[msg("Address cannot be the zero address.")]
  ZeroAddress,
  // `decision`
  #[msg("Pool reserves do not allow this operation.")]
  InvalidReserveRatio,
  #[msg("Pool has no reserves or no active liquidity.")]
  EmptyPool,
  #[msg("Trade executed on the wrong side of the peg.")]
  UnfavorableExecution,
  #[msg("Arithmetic error while planning a peg correction.")]
  DecisionArithmetic,
  // `price`
  #[msg("Arithmetic error while computing pool price.")]
  PriceArithmetic,
  // `conversion`
  #[msg("Overflow while converting between token decimals.")]
  DecimalConversion,
  // `pair_math`
  #[msg("Arithmetic error in pair curve math.")]
  PairArithmetic,
  #[msg("Stable curve did not converge.")]
  StableCurveConvergence,
  // `clmm_math`
  #[msg("Tick is outside of [MIN_TICK, MAX_TICK].")]
  TickOutOfBounds,
  #[msg("Arithmetic error in concentrated liquidity math.")]
  LiquidityArithmetic,
  // `slippage_config`
  #[msg("Arithmetic error while computing slippage tolerance.")]
  SlippageArithmetic,
  #[msg("Token out is below the tolerable minimum.")]
  SlippageExceeded,
  // `clock`
  #[msg("Transaction deadline has passed.")]
  DeadlineExpired,
  // `roles`
  #[msg("Account is missing the required role.")]
  MissingRole,
  // `lifecycle`
  #[msg("Pausable: paused")]
  EnforcedPause,
  #[msg("Pausable: not paused")]
  ExpectedPause,
  // `executor`
  #[msg("Liquidity minted is below the requested minimum.")]
  InsufficientLiquidityMinted,
  #[msg("Reward token is not whitelisted.")]
  TokenNotWhitelisted,
  #[msg("Pool has no gauge configured.")]
  NoGauge,
  #[msg("Overflow while accounting AMO balances.")]
  MathOverflow,
}
