use anchor_lang::prelude::*;
use crate::constants::RANDOMNESS_BYTES_CONSUMED;
use crate::errors::ErrorCode;

pub fn checked_add_u64(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(ErrorCode::MathOverflow.into())
}

/// Little-endian value of the leading randomness bytes; the rest is ignored.
pub fn randomness_value(randomness: &[u8; 32]) -> u128 {
    let mut bytes16 = [0u8; RANDOMNESS_BYTES_CONSUMED];
    bytes16.copy_from_slice(&randomness[..RANDOMNESS_BYTES_CONSUMED]);
    u128::from_le_bytes(bytes16)
}

/// `randomness mod players`. Plain modulo, no rejection sampling.
pub fn winner_index(randomness: &[u8; 32], players: usize) -> Result<usize> {
    require!(players > 0, ErrorCode::NoPlayers);
    Ok((randomness_value(randomness) % players as u128) as usize)
}

/// Moves `amount` lamports out of a program-owned account.
///
/// Refuses instead of leaving either side in a state the runtime would
/// reject at the end of the transaction: the source must keep
/// `from_reserve` and the recipient must end up rent exempt.
///
/// `from`'s data is never borrowed, so the caller may hold it loaded.
pub fn transfer_prize(
    from: &AccountInfo,
    to: &AccountInfo,
    amount: u64,
    from_reserve: u64,
    rent: &Rent,
) -> Result<()> {
    require!(to.is_writable, ErrorCode::PayoutFailed);

    let from_after = from
        .lamports()
        .checked_sub(amount)
        .ok_or(ErrorCode::PayoutFailed)?;
    require!(from_after >= from_reserve, ErrorCode::PayoutFailed);

    let to_after = checked_add_u64(to.lamports(), amount)?;
    require!(
        rent.is_exempt(to_after, to.data_len()),
        ErrorCode::PayoutFailed
    );

    **from.try_borrow_mut_lamports()? = from_after;
    **to.try_borrow_mut_lamports()? = to_after;
    Ok(())
}
