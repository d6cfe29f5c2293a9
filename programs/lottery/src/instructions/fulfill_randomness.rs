use anchor_lang::prelude::*;
use crate::{
    constants::*,
    errors::ErrorCode,
    events::{RoundOpened, WinnerPicked},
    oracle::VRF_PROGRAM_IDENTITY,
    state::{Draw, Lottery},
    utils::transfer_prize,
};

/// VRF callback. Remaining accounts are the round's distinct entrants,
/// registered when the request was issued.
#[derive(Accounts)]
pub struct FulfillRandomness<'info> {
    /// VRF program identity PDA: only the VRF program can produce this signature.
    #[account(address = VRF_PROGRAM_IDENTITY)]
    pub vrf_program_identity: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_LOTTERY],
        bump,
    )]
    pub lottery: AccountLoader<'info, Lottery>,

    /// CHECK: request ticket; its address is the request id, matched against the pending request.
    pub request: UncheckedAccount<'info>,
}

pub fn handler<'info>(ctx: Context<'_, '_, '_, 'info, FulfillRandomness<'info>>, randomness: [u8; 32]) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let rent = Rent::get()?;
    let request_id = ctx.accounts.request.key().to_bytes();

    let (draw, next_round_id) = settle_and_pay(
        &ctx.accounts.lottery,
        ctx.remaining_accounts,
        &request_id,
        &randomness,
        now,
        &rent,
    )?;

    msg!(
        "Round {} winner index {} -> {} ({} lamports)",
        draw.round_id,
        draw.winner_index,
        draw.winner,
        draw.prize
    );

    emit!(WinnerPicked {
        round_id: draw.round_id,
        winner: draw.winner,
        prize: draw.prize,
        request_id,
    });

    emit!(RoundOpened {
        round_id: next_round_id,
        opened_at: now,
    });

    Ok(())
}

/// Settles `request_id` and credits the winner found among `candidates`.
/// Returns the draw and the id of the round it opened.
///
/// The lottery stays loaded across the payout, so the rent reserve is
/// read from the account before its data is borrowed.
pub fn settle_and_pay<'info>(
    lottery: &AccountLoader<'info, Lottery>,
    candidates: &[AccountInfo<'info>],
    request_id: &[u8; 32],
    randomness: &[u8; 32],
    now: i64,
    rent: &Rent,
) -> Result<(Draw, u64)> {
    let lottery_info = lottery.to_account_info();
    let reserve = rent.minimum_balance(lottery_info.data_len());

    let mut state = lottery.load_mut()?;
    let draw = state.settle(request_id, randomness, now, |draw| {
        let winner = candidates
            .iter()
            .find(|account| account.key == &draw.winner)
            .ok_or(ErrorCode::PayoutFailed)?;
        transfer_prize(&lottery_info, winner, draw.prize, reserve, rent)
    })?;

    Ok((draw, state.round_id))
}
