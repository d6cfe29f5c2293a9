use anchor_lang::prelude::*;
use crate::{constants::*, events::RoundOpened, oracle::DEFAULT_QUEUE, state::Lottery};

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeArgs {
    /// Lamports required per entry.
    pub entrance_fee: u64,
    /// Minimum time a round stays open before upkeep may close it.
    pub interval_sec: u32,
    /// VRF queue to request from. `None` uses the provider's default queue.
    pub oracle_queue: Option<Pubkey>,
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = Lottery::SPACE,
        seeds = [SEED_LOTTERY],
        bump
    )]
    pub lottery: AccountLoader<'info, Lottery>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, args: InitializeArgs) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let oracle_queue = args.oracle_queue.unwrap_or(DEFAULT_QUEUE);

    let mut lottery = ctx.accounts.lottery.load_init()?;
    lottery.open_first_round(
        args.entrance_fee,
        i64::from(args.interval_sec),
        oracle_queue,
        ctx.bumps.lottery,
        now,
    )?;

    msg!(
        "Lottery initialized: fee={} interval={}s queue={}",
        args.entrance_fee,
        args.interval_sec,
        oracle_queue
    );

    emit!(RoundOpened {
        round_id: lottery.round_id,
        opened_at: now,
    });

    Ok(())
}
