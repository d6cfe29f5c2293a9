use anchor_lang::prelude::*;
use crate::{
    constants::*,
    errors::ErrorCode,
    events::UpkeepPerformed,
    oracle::{callback_accounts, derive_request_id, RandomnessRequest, VRF_PROGRAM_ID},
    state::Lottery,
};

#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    /// Pays the oracle request; any keeper may call.
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_LOTTERY],
        bump,
    )]
    pub lottery: AccountLoader<'info, Lottery>,

    /// CHECK: Our program's identity PDA, used to sign the VRF CPI.
    #[account(seeds = [SEED_IDENTITY], bump)]
    pub program_identity: AccountInfo<'info>,

    /// CHECK: Oracle queue account, matched against the configured queue in the handler.
    #[account(mut)]
    pub oracle_queue: AccountInfo<'info>,

    /// CHECK: MagicBlock VRF program
    #[account(address = VRF_PROGRAM_ID)]
    pub vrf_program: AccountInfo<'info>,

    /// CHECK: SlotHashes sysvar
    #[account(address = anchor_lang::solana_program::sysvar::slot_hashes::ID)]
    pub slot_hashes: AccountInfo<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<PerformUpkeep>, _perform_data: Vec<u8>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let lottery_key = ctx.accounts.lottery.key();

    // The keeper's own check_upkeep result is not trusted.
    let (request_id, players) = {
        let lottery = ctx.accounts.lottery.load()?;
        require!(lottery.is_ready_for_upkeep(now), ErrorCode::UpkeepNotNeeded);
        require_keys_eq!(
            ctx.accounts.oracle_queue.key(),
            lottery.oracle_queue(),
            ErrorCode::InvalidOracleQueue
        );
        (
            derive_request_id(&lottery_key, lottery.request_nonce),
            lottery.ledger.distinct_players(),
        )
    };

    RandomnessRequest {
        payer: &ctx.accounts.payer.to_account_info(),
        program_identity: &ctx.accounts.program_identity,
        identity_bump: ctx.bumps.program_identity,
        oracle_queue: &ctx.accounts.oracle_queue,
        slot_hashes: &ctx.accounts.slot_hashes,
        system_program: &ctx.accounts.system_program.to_account_info(),
    }
    .send(request_id, callback_accounts(&lottery_key, &request_id, &players))?;

    // Update state after CPI
    let mut lottery = ctx.accounts.lottery.load_mut()?;
    lottery.begin_calculating(request_id, now)?;

    msg!(
        "Round {} calculating: {} entries, {} lamports",
        lottery.round_id,
        lottery.ledger.len(),
        lottery.ledger.balance
    );

    emit!(UpkeepPerformed {
        round_id: lottery.round_id,
        request_id,
    });

    Ok(())
}
