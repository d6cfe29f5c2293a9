use anchor_lang::prelude::*;
use crate::{constants::*, state::Lottery};

/// Returned to keepers as instruction return data.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub upkeep_needed: bool,
    /// Reserved for keeper payloads; always empty.
    pub perform_data: Vec<u8>,
}

#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(seeds = [SEED_LOTTERY], bump)]
    pub lottery: AccountLoader<'info, Lottery>,
}

pub fn handler(ctx: Context<CheckUpkeep>, _check_data: Vec<u8>) -> Result<UpkeepStatus> {
    let now = Clock::get()?.unix_timestamp;
    let lottery = ctx.accounts.lottery.load()?;

    Ok(UpkeepStatus {
        upkeep_needed: lottery.is_ready_for_upkeep(now),
        perform_data: Vec::new(),
    })
}
