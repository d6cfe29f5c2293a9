use anchor_lang::prelude::*;

#[event]
pub struct RoundOpened {
    pub round_id: u64,
    pub opened_at: i64,
}

#[event]
pub struct Entered {
    pub round_id: u64,
    pub player: Pubkey,
    pub amount: u64,
    pub number_of_players: u16,
}

#[event]
pub struct UpkeepPerformed {
    pub round_id: u64,
    pub request_id: [u8; 32],
}

#[event]
pub struct WinnerPicked {
    pub round_id: u64,
    pub winner: Pubkey,
    pub prize: u64,
    pub request_id: [u8; 32],
}
