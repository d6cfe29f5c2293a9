use anchor_lang::prelude::*;
use crate::{
    constants::*,
    state::{Lottery, LotteryInfo},
};

#[derive(Accounts)]
pub struct ReadLottery<'info> {
    #[account(seeds = [SEED_LOTTERY], bump)]
    pub lottery: AccountLoader<'info, Lottery>,
}

pub fn lottery_info(ctx: Context<ReadLottery>) -> Result<LotteryInfo> {
    Ok(ctx.accounts.lottery.load()?.info())
}

pub fn player(ctx: Context<ReadLottery>, index: u16) -> Result<Pubkey> {
    ctx.accounts.lottery.load()?.player(index as usize)
}
