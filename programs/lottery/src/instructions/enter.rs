use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};
use crate::{constants::*, events::Entered, state::Lottery};

#[derive(Accounts)]
pub struct Enter<'info> {
    #[account(mut)]
    pub player: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_LOTTERY],
        bump,
    )]
    pub lottery: AccountLoader<'info, Lottery>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Enter>, amount: u64) -> Result<()> {
    let player = ctx.accounts.player.key();

    let (round_id, number_of_players) = {
        let mut lottery = ctx.accounts.lottery.load_mut()?;
        lottery.enter(player, amount)?;
        (lottery.round_id, lottery.ledger.count)
    };

    // Fees sit on the lottery account itself, above its rent reserve.
    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.player.to_account_info(),
                to: ctx.accounts.lottery.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(Entered {
        round_id,
        player,
        amount,
        number_of_players,
    });

    Ok(())
}
