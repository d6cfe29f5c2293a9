use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Amount is below the entrance fee")]
    InsufficientFee,
    #[msg("Lottery is not open")]
    NotOpen,
    #[msg("Upkeep not needed")]
    UpkeepNotNeeded,
    #[msg("Randomness fulfillment does not match the pending request")]
    UnknownRequest,
    #[msg("Randomness request could not be issued")]
    RequestFailed,
    #[msg("Prize transfer to the winner failed")]
    PayoutFailed,
    #[msg("Entrance fee must be greater than zero")]
    InvalidEntranceFee,
    #[msg("Interval must be greater than zero")]
    InvalidInterval,
    #[msg("Round has reached the maximum number of entries or players")]
    LotteryFull,
    #[msg("Player index out of range")]
    PlayerIndexOutOfRange,
    #[msg("Oracle queue does not match the configured queue")]
    InvalidOracleQueue,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Round has no players to draw from")]
    NoPlayers,
}
