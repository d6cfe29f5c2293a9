use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod oracle;
pub mod state;
pub mod utils;
pub mod instructions;

use instructions::*;
use state::LotteryInfo;

#[cfg(feature = "devnet")]
declare_id!("4WoNjvSi6jnF3ZdBQ68EhLN29LLgqoSCrH2QE6r8S2mi");

#[cfg(not(feature = "devnet"))]
declare_id!("2UfoN26wTbkS9VviJUY52cDQex8jTQ4tbCChcqRrjVsv");

#[program]
pub mod lottery {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, args: InitializeArgs) -> Result<()> {
        initialize::handler(ctx, args)
    }

    /// Pay at least the entrance fee to join the open round.
    pub fn enter(ctx: Context<Enter>, amount: u64) -> Result<()> {
        enter::handler(ctx, amount)
    }

    /// Read-only keeper predicate.
    pub fn check_upkeep(ctx: Context<CheckUpkeep>, check_data: Vec<u8>) -> Result<UpkeepStatus> {
        check_upkeep::handler(ctx, check_data)
    }

    /// Anyone can trigger upkeep; it only succeeds while `check_upkeep` holds.
    pub fn perform_upkeep(ctx: Context<PerformUpkeep>, perform_data: Vec<u8>) -> Result<()> {
        perform_upkeep::handler(ctx, perform_data)
    }

    /// VRF callback: picks the winner, pays out the round and reopens entry.
    pub fn fulfill_randomness<'info>(ctx: Context<'_, '_, '_, 'info, FulfillRandomness<'info>>, randomness: [u8; 32]) -> Result<()> {
        fulfill_randomness::handler(ctx, randomness)
    }

    pub fn get_lottery_info(ctx: Context<ReadLottery>) -> Result<LotteryInfo> {
        queries::lottery_info(ctx)
    }

    pub fn get_player(ctx: Context<ReadLottery>, index: u16) -> Result<Pubkey> {
        queries::player(ctx, index)
    }
}
