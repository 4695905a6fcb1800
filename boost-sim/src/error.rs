use anchor_lang::prelude::error_code;

#[error_code]
pub enum SimError {
  // `ledger`
  #[msg("Mint is not registered with the ledger.")]
  UnknownMint = 8000,
  #[msg("Account balance is too low for this transfer.")]
  InsufficientBalance,
  #[msg("Overflow while crediting a balance.")]
  BalanceOverflow,
  // `minter`
  #[msg("Caller lacks the Minter's AMO role.")]
  MinterRoleMissing,
  #[msg("Cannot mint zero tokens.")]
  MintZero,
  #[msg("Cannot burn zero tokens.")]
  BurnZero,
  // `pair`
  #[msg("Router: EXPIRED")]
  Expired,
  #[msg("Token does not belong to this pool.")]
  InvalidToken,
  #[msg("Router: INSUFFICIENT_A_AMOUNT")]
  InsufficientAmountA,
  #[msg("Router: INSUFFICIENT_B_AMOUNT")]
  InsufficientAmountB,
  #[msg("Router: INSUFFICIENT_OUTPUT_AMOUNT")]
  InsufficientOutputAmount,
  #[msg("Pair: INSUFFICIENT_LIQUIDITY_MINTED")]
  InsufficientLiquidityMinted,
  #[msg("Pair: INSUFFICIENT_LIQUIDITY_BURNED")]
  InsufficientLiquidityBurned,
  // `gauge`
  #[msg("Pair has no gauge.")]
  NoGauge,
  #[msg("Token id is not registered to this owner.")]
  InvalidTokenId,
  #[msg("Staked balance is too low for this withdrawal.")]
  InsufficientStake,
  #[msg("Cannot deposit zero into the gauge.")]
  DepositZero,
  #[msg("Gauge has no stake to distribute rewards to.")]
  NoStake,
  // `cl_pool`
  #[msg("Tick range is invalid.")]
  InvalidTickRange,
  #[msg("Liquidity amount must be positive.")]
  ZeroLiquidity,
  #[msg("Position does not hold enough liquidity.")]
  InsufficientPositionLiquidity,
  #[msg("Square root price limit is on the wrong side of the price.")]
  InvalidPriceLimit,
  #[msg("Arithmetic error in pool accounting.")]
  PoolArithmetic,
}
