use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};
use crate::{
    constants::{MAX_ENTRIES, MAX_PLAYERS},
    errors::ErrorCode,
    utils::{checked_add_u64, winner_index},
};

/// Entrants of the current round, in entry order, plus the fees they paid.
/// Wrapper because bytemuck doesn't impl Pod for arbitrary array sizes.
#[derive(Copy, Clone)]
#[repr(C)]
pub struct Ledger {
    pub balance: u64,
    pub count: u16,
    /// Distinct addresses among `players[..count]`.
    pub distinct: u16,
    pub _padding: [u8; 4],
    pub players: [[u8; 32]; MAX_ENTRIES],
}

unsafe impl Pod for Ledger {}
unsafe impl Zeroable for Ledger {}

#[cfg(feature = "idl-build")]
impl anchor_lang::IdlBuild for Ledger {
    fn create_type() -> Option<anchor_lang::idl::types::IdlTypeDef> {
        use anchor_lang::idl::types::*;
        Some(IdlTypeDef {
            name: "Ledger".to_string(),
            docs: vec![],
            serialization: IdlSerialization::Bytemuck,
            repr: Some(IdlRepr::C(IdlReprModifier { packed: false, align: None })),
            generics: vec![],
            ty: IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Named(vec![
                    IdlField {
                        name: "balance".to_string(),
                        docs: vec![],
                        ty: IdlType::U64,
                    },
                    IdlField {
                        name: "count".to_string(),
                        docs: vec![],
                        ty: IdlType::U16,
                    },
                    IdlField {
                        name: "distinct".to_string(),
                        docs: vec![],
                        ty: IdlType::U16,
                    },
                    IdlField {
                        name: "_padding".to_string(),
                        docs: vec![],
                        ty: IdlType::Array(Box::new(IdlType::U8), IdlArrayLen::Value(4)),
                    },
                    IdlField {
                        name: "players".to_string(),
                        docs: vec![],
                        ty: IdlType::Array(
                            Box::new(IdlType::Array(Box::new(IdlType::U8), IdlArrayLen::Value(32))),
                            IdlArrayLen::Value(MAX_ENTRIES),
                        ),
                    },
                ])),
            },
        })
    }
    fn insert_types(types: &mut std::collections::BTreeMap<String, anchor_lang::idl::types::IdlTypeDef>) {
        if let Some(ty) = Self::create_type() {
            types.insert("Ledger".to_string(), ty);
        }
    }
    fn get_full_path() -> String {
        "Ledger".to_string()
    }
}

impl Ledger {
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn player(&self, index: usize) -> Option<Pubkey> {
        if index < self.len() {
            Some(Pubkey::new_from_array(self.players[index]))
        } else {
            None
        }
    }

    pub fn players(&self) -> impl Iterator<Item = Pubkey> + '_ {
        self.players[..self.len()]
            .iter()
            .map(|bytes| Pubkey::new_from_array(*bytes))
    }

    /// Entrants with duplicates removed, first appearance wins.
    pub fn distinct_players(&self) -> Vec<Pubkey> {
        let mut distinct: Vec<Pubkey> = Vec::with_capacity(self.len());
        for player in self.players() {
            if !distinct.contains(&player) {
                distinct.push(player);
            }
        }
        distinct
    }

    pub fn contains(&self, player: &Pubkey) -> bool {
        self.players[..self.len()]
            .iter()
            .any(|bytes| bytes == player.as_ref())
    }

    /// Records one entry. Full once either `MAX_ENTRIES` entries or
    /// `MAX_PLAYERS` distinct players are in; repeat entries from a known
    /// player only count against the former.
    pub fn append(&mut self, player: Pubkey, amount: u64) -> Result<()> {
        require!(self.len() < MAX_ENTRIES, ErrorCode::LotteryFull);
        let is_new = !self.contains(&player);
        if is_new {
            require!((self.distinct as usize) < MAX_PLAYERS, ErrorCode::LotteryFull);
        }
        let balance = checked_add_u64(self.balance, amount)?;

        self.players[self.len()] = player.to_bytes();
        self.count += 1;
        if is_new {
            self.distinct += 1;
        }
        self.balance = balance;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Ledger::zeroed();
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LotteryState {
    Open,
    Calculating,
}

/// The single raffle account: parameters, the live round and its ledger.
/// Zero-copy; instructions go through `AccountLoader<'info, Lottery>`.
#[account(zero_copy)]
#[repr(C)]
pub struct Lottery {
    pub entrance_fee: u64,
    pub interval: i64,
    pub opened_at: i64,
    pub round_id: u64,
    pub request_nonce: u64,
    pub recent_prize: u64,

    pub oracle_queue: [u8; 32],
    pub pending_request_id: [u8; 32],
    pub recent_winner: [u8; 32],

    pub state: u8,
    pub has_pending_request: u8,
    pub bump: u8,
    pub _padding: [u8; 5],

    pub ledger: Ledger,
    pub reserved: [u8; 32],
}

/// Outcome of matching a fulfillment against the pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub round_id: u64,
    pub winner: Pubkey,
    pub winner_index: usize,
    pub prize: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct LotteryInfo {
    pub round_id: u64,
    pub state: LotteryState,
    pub entrance_fee: u64,
    pub interval: i64,
    pub opened_at: i64,
    pub number_of_players: u16,
    pub balance: u64,
    pub recent_winner: Option<Pubkey>,
    pub recent_prize: u64,
    pub pending_request_id: Option<[u8; 32]>,
}

impl Lottery {
    pub const SPACE: usize = 8 + core::mem::size_of::<Lottery>();

    pub fn open_first_round(
        &mut self,
        entrance_fee: u64,
        interval: i64,
        oracle_queue: Pubkey,
        bump: u8,
        now: i64,
    ) -> Result<()> {
        require!(entrance_fee > 0, ErrorCode::InvalidEntranceFee);
        require!(interval > 0, ErrorCode::InvalidInterval);

        self.entrance_fee = entrance_fee;
        self.interval = interval;
        self.oracle_queue = oracle_queue.to_bytes();
        self.bump = bump;
        self.round_id = 1;
        self.opened_at = now;
        self.state = LotteryState::Open as u8;
        self.has_pending_request = 0;
        self.pending_request_id = [0u8; 32];
        self.ledger.reset();
        Ok(())
    }

    pub fn state(&self) -> LotteryState {
        if self.state == LotteryState::Calculating as u8 {
            LotteryState::Calculating
        } else {
            LotteryState::Open
        }
    }

    pub fn oracle_queue(&self) -> Pubkey {
        Pubkey::new_from_array(self.oracle_queue)
    }

    /// Set exactly while the lottery is calculating.
    pub fn pending_request_id(&self) -> Option<[u8; 32]> {
        (self.has_pending_request != 0).then_some(self.pending_request_id)
    }

    pub fn recent_winner(&self) -> Option<Pubkey> {
        let winner = Pubkey::new_from_array(self.recent_winner);
        (winner != Pubkey::default()).then_some(winner)
    }

    pub fn player(&self, index: usize) -> Result<Pubkey> {
        self.ledger
            .player(index)
            .ok_or(ErrorCode::PlayerIndexOutOfRange.into())
    }

    pub fn enter(&mut self, player: Pubkey, amount: u64) -> Result<()> {
        require!(amount >= self.entrance_fee, ErrorCode::InsufficientFee);
        require!(self.state() == LotteryState::Open, ErrorCode::NotOpen);
        self.ledger.append(player, amount)
    }

    pub fn is_ready_for_upkeep(&self, now: i64) -> bool {
        let time_passed = now
            .checked_sub(self.opened_at)
            .map_or(false, |elapsed| elapsed >= self.interval);

        self.state() == LotteryState::Open
            && time_passed
            && self.ledger.balance > 0
            && !self.ledger.is_empty()
    }

    /// Closes entry and records the outstanding oracle request.
    pub fn begin_calculating(&mut self, request_id: [u8; 32], now: i64) -> Result<()> {
        require!(self.is_ready_for_upkeep(now), ErrorCode::UpkeepNotNeeded);
        let next_nonce = checked_add_u64(self.request_nonce, 1)?;

        self.state = LotteryState::Calculating as u8;
        self.pending_request_id = request_id;
        self.has_pending_request = 1;
        self.request_nonce = next_nonce;
        Ok(())
    }

    /// Picks the winner for `request_id` without touching state.
    pub fn draw(&self, request_id: &[u8; 32], randomness: &[u8; 32]) -> Result<Draw> {
        require!(
            self.state() == LotteryState::Calculating
                && self.pending_request_id() == Some(*request_id),
            ErrorCode::UnknownRequest
        );

        let index = winner_index(randomness, self.ledger.len())?;
        let winner = self
            .ledger
            .player(index)
            .ok_or(ErrorCode::PlayerIndexOutOfRange)?;

        Ok(Draw {
            round_id: self.round_id,
            winner,
            winner_index: index,
            prize: self.ledger.balance,
        })
    }

    /// Consumes the pending request: draws, pays through `pay`, then opens
    /// the next round. A failed payout leaves the lottery calculating.
    pub fn settle<F>(
        &mut self,
        request_id: &[u8; 32],
        randomness: &[u8; 32],
        now: i64,
        pay: F,
    ) -> Result<Draw>
    where
        F: FnOnce(&Draw) -> Result<()>,
    {
        let draw = self.draw(request_id, randomness)?;
        let next_round = checked_add_u64(self.round_id, 1)?;

        if let Err(err) = pay(&draw) {
            msg!(
                "Payout of {} lamports to {} failed: {}",
                draw.prize,
                draw.winner,
                err
            );
            return err!(ErrorCode::PayoutFailed);
        }

        self.recent_winner = draw.winner.to_bytes();
        self.recent_prize = draw.prize;
        self.pending_request_id = [0u8; 32];
        self.has_pending_request = 0;
        self.ledger.reset();
        self.state = LotteryState::Open as u8;
        self.opened_at = now;
        self.round_id = next_round;

        Ok(draw)
    }

    pub fn info(&self) -> LotteryInfo {
        LotteryInfo {
            round_id: self.round_id,
            state: self.state(),
            entrance_fee: self.entrance_fee,
            interval: self.interval,
            opened_at: self.opened_at,
            number_of_players: self.ledger.count,
            balance: self.ledger.balance,
            recent_winner: self.recent_winner(),
            recent_prize: self.recent_prize,
            pending_request_id: self.pending_request_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEE: u64 = 100;
    const INTERVAL: i64 = 30;
    const OPENED_AT: i64 = 1_000;

    fn player(seed: u8) -> Pubkey {
        Pubkey::new_from_array([seed; 32])
    }

    fn sample_lottery() -> Lottery {
        let mut lottery = Lottery::zeroed();
        lottery
            .open_first_round(FEE, INTERVAL, player(200), 254, OPENED_AT)
            .unwrap();
        lottery
    }

    fn randomness_with(value: u64) -> [u8; 32] {
        let mut randomness = [0u8; 32];
        randomness[..8].copy_from_slice(&value.to_le_bytes());
        randomness
    }

    fn assert_rejected<T: std::fmt::Debug>(result: Result<T>, expected: ErrorCode) {
        let err = result.unwrap_err();
        assert_eq!(ProgramError::from(err), ProgramError::Custom(expected.into()));
    }

    fn calculating_lottery(request_id: [u8; 32]) -> Lottery {
        let mut lottery = sample_lottery();
        lottery.enter(player(1), FEE).unwrap();
        lottery.enter(player(2), FEE).unwrap();
        lottery.begin_calculating(request_id, OPENED_AT + INTERVAL).unwrap();
        lottery
    }

    #[test]
    fn opens_first_round() {
        let lottery = sample_lottery();
        assert_eq!(lottery.state(), LotteryState::Open);
        assert_eq!(lottery.round_id, 1);
        assert_eq!(lottery.opened_at, OPENED_AT);
        assert_eq!(lottery.oracle_queue(), player(200));
        assert_eq!(lottery.pending_request_id(), None);
        assert_eq!(lottery.recent_winner(), None);
        assert!(lottery.ledger.is_empty());
    }

    #[test]
    fn rejects_zero_parameters() {
        let mut lottery = Lottery::zeroed();
        assert_rejected(
            lottery.open_first_round(0, INTERVAL, player(200), 254, OPENED_AT),
            ErrorCode::InvalidEntranceFee,
        );
        assert_rejected(
            lottery.open_first_round(FEE, 0, player(200), 254, OPENED_AT),
            ErrorCode::InvalidInterval,
        );
    }

    #[test]
    fn enter_appends_and_credits() {
        let mut lottery = sample_lottery();
        lottery.enter(player(1), FEE).unwrap();
        lottery.enter(player(2), FEE + 50).unwrap();
        lottery.enter(player(1), FEE).unwrap();

        assert_eq!(lottery.ledger.len(), 3);
        assert_eq!(lottery.ledger.balance, 3 * FEE + 50);
        assert_eq!(lottery.player(0).unwrap(), player(1));
        assert_eq!(lottery.player(1).unwrap(), player(2));
        assert_eq!(lottery.player(2).unwrap(), player(1));
        assert_rejected(lottery.player(3), ErrorCode::PlayerIndexOutOfRange);
    }

    #[test]
    fn enter_below_fee_leaves_ledger_untouched() {
        let mut lottery = sample_lottery();
        lottery.enter(player(1), FEE).unwrap();

        assert_rejected(lottery.enter(player(2), FEE - 1), ErrorCode::InsufficientFee);
        assert_rejected(lottery.enter(player(2), 0), ErrorCode::InsufficientFee);
        assert_eq!(lottery.ledger.len(), 1);
        assert_eq!(lottery.ledger.balance, FEE);
    }

    #[test]
    fn enter_rejected_while_calculating() {
        let mut lottery = calculating_lottery([7u8; 32]);
        assert_rejected(lottery.enter(player(3), FEE), ErrorCode::NotOpen);
        assert_eq!(lottery.ledger.len(), 2);
    }

    #[test]
    fn enter_rejects_new_player_beyond_distinct_limit() {
        let mut lottery = sample_lottery();
        for seed in 0..MAX_PLAYERS {
            lottery.enter(player(seed as u8 + 1), FEE).unwrap();
        }
        assert_rejected(lottery.enter(player(99), FEE), ErrorCode::LotteryFull);
        assert_eq!(lottery.ledger.len(), MAX_PLAYERS);
        assert_eq!(lottery.ledger.distinct as usize, MAX_PLAYERS);
        assert_eq!(lottery.ledger.balance, FEE * MAX_PLAYERS as u64);

        // Known players may keep entering.
        lottery.enter(player(1), FEE).unwrap();
        lottery.enter(player(MAX_PLAYERS as u8), FEE).unwrap();
        assert_eq!(lottery.ledger.len(), MAX_PLAYERS + 2);
        assert_eq!(lottery.ledger.distinct as usize, MAX_PLAYERS);
        assert_eq!(lottery.ledger.distinct_players().len(), MAX_PLAYERS);
    }

    #[test]
    fn enter_rejects_repeat_entries_beyond_entry_limit() {
        let mut lottery = sample_lottery();
        for _ in 0..MAX_ENTRIES {
            lottery.enter(player(1), FEE).unwrap();
        }
        assert_rejected(lottery.enter(player(1), FEE), ErrorCode::LotteryFull);
        assert_rejected(lottery.enter(player(2), FEE), ErrorCode::LotteryFull);
        assert_eq!(lottery.ledger.len(), MAX_ENTRIES);
        assert_eq!(lottery.ledger.distinct, 1);
        assert_eq!(lottery.ledger.balance, FEE * MAX_ENTRIES as u64);
    }

    #[test]
    fn settle_reset_clears_distinct_count() {
        let mut lottery = calculating_lottery([7u8; 32]);
        assert_eq!(lottery.ledger.distinct, 2);
        lottery
            .settle(&[7u8; 32], &randomness_with(0), 2_000, |_| Ok(()))
            .unwrap();
        assert_eq!(lottery.ledger.distinct, 0);
        assert!(!lottery.ledger.contains(&player(1)));
    }

    #[test]
    fn enter_rejects_balance_overflow() {
        let mut lottery = sample_lottery();
        lottery.enter(player(1), u64::MAX).unwrap();
        assert_rejected(lottery.enter(player(2), FEE), ErrorCode::MathOverflow);
        assert_eq!(lottery.ledger.len(), 1);
        assert_eq!(lottery.ledger.distinct, 1);
    }

    #[test]
    fn upkeep_requires_time_players_and_balance() {
        let mut lottery = sample_lottery();
        assert!(!lottery.is_ready_for_upkeep(OPENED_AT + INTERVAL));

        lottery.enter(player(1), FEE).unwrap();
        assert!(!lottery.is_ready_for_upkeep(OPENED_AT + INTERVAL - 1));
        assert!(lottery.is_ready_for_upkeep(OPENED_AT + INTERVAL));
        assert!(!lottery.is_ready_for_upkeep(OPENED_AT - 5));
    }

    #[test]
    fn upkeep_not_ready_once_calculating() {
        let lottery = calculating_lottery([7u8; 32]);
        assert!(!lottery.is_ready_for_upkeep(OPENED_AT + 10 * INTERVAL));
    }

    #[test]
    fn begin_calculating_records_single_request() {
        let mut lottery = calculating_lottery([7u8; 32]);
        assert_eq!(lottery.state(), LotteryState::Calculating);
        assert_eq!(lottery.pending_request_id(), Some([7u8; 32]));
        assert_eq!(lottery.request_nonce, 1);

        assert_rejected(
            lottery.begin_calculating([8u8; 32], OPENED_AT + INTERVAL),
            ErrorCode::UpkeepNotNeeded,
        );
        assert_eq!(lottery.pending_request_id(), Some([7u8; 32]));
        assert_eq!(lottery.request_nonce, 1);
    }

    #[test]
    fn begin_calculating_rejected_without_entries() {
        let mut lottery = sample_lottery();
        assert_rejected(
            lottery.begin_calculating([7u8; 32], OPENED_AT + INTERVAL),
            ErrorCode::UpkeepNotNeeded,
        );
        assert_eq!(lottery.state(), LotteryState::Open);
        assert_eq!(lottery.pending_request_id(), None);
    }

    #[test]
    fn draw_rejects_foreign_request() {
        let lottery = calculating_lottery([7u8; 32]);
        assert_rejected(
            lottery.draw(&[8u8; 32], &randomness_with(1)),
            ErrorCode::UnknownRequest,
        );
    }

    #[test]
    fn draw_rejects_when_open() {
        let mut lottery = sample_lottery();
        lottery.enter(player(1), FEE).unwrap();
        // Zeroed id must not match anything while open.
        assert_rejected(
            lottery.draw(&[0u8; 32], &randomness_with(1)),
            ErrorCode::UnknownRequest,
        );
    }

    #[test]
    fn settle_unknown_request_changes_nothing() {
        let mut lottery = calculating_lottery([7u8; 32]);
        let mut paid = false;
        let result = lottery.settle(&[9u8; 32], &randomness_with(1), 2_000, |_| {
            paid = true;
            Ok(())
        });

        assert_rejected(result, ErrorCode::UnknownRequest);
        assert!(!paid);
        assert_eq!(lottery.state(), LotteryState::Calculating);
        assert_eq!(lottery.ledger.len(), 2);
        assert_eq!(lottery.ledger.balance, 2 * FEE);
    }

    #[test]
    fn settle_pays_winner_and_reopens() {
        let mut lottery = calculating_lottery([7u8; 32]);
        let mut paid = None;
        let draw = lottery
            .settle(&[7u8; 32], &randomness_with(3), 2_000, |draw| {
                paid = Some((draw.winner, draw.prize));
                Ok(())
            })
            .unwrap();

        assert_eq!(draw.winner_index, 1);
        assert_eq!(draw.winner, player(2));
        assert_eq!(draw.round_id, 1);
        assert_eq!(paid, Some((player(2), 2 * FEE)));

        assert_eq!(lottery.state(), LotteryState::Open);
        assert_eq!(lottery.pending_request_id(), None);
        assert!(lottery.ledger.is_empty());
        assert_eq!(lottery.ledger.balance, 0);
        assert_eq!(lottery.opened_at, 2_000);
        assert_eq!(lottery.round_id, 2);
        assert_eq!(lottery.recent_winner(), Some(player(2)));
        assert_eq!(lottery.recent_prize, 2 * FEE);
    }

    #[test]
    fn settle_twice_with_same_id_fails() {
        let mut lottery = calculating_lottery([7u8; 32]);
        lottery
            .settle(&[7u8; 32], &randomness_with(0), 2_000, |_| Ok(()))
            .unwrap();

        let replay = lottery.settle(&[7u8; 32], &randomness_with(0), 2_001, |_| Ok(()));
        assert_rejected(replay, ErrorCode::UnknownRequest);
        assert_eq!(lottery.round_id, 2);
    }

    #[test]
    fn failed_payout_keeps_round_calculating() {
        let mut lottery = calculating_lottery([7u8; 32]);
        let result = lottery.settle(&[7u8; 32], &randomness_with(0), 2_000, |_| {
            err!(ErrorCode::MathOverflow)
        });

        assert_rejected(result, ErrorCode::PayoutFailed);
        assert_eq!(lottery.state(), LotteryState::Calculating);
        assert_eq!(lottery.pending_request_id(), Some([7u8; 32]));
        assert_eq!(lottery.ledger.len(), 2);
        assert_eq!(lottery.ledger.balance, 2 * FEE);
        assert_eq!(lottery.recent_winner(), None);
    }

    #[test]
    fn distinct_players_keep_entry_order() {
        let mut lottery = sample_lottery();
        lottery.enter(player(3), FEE).unwrap();
        lottery.enter(player(1), FEE).unwrap();
        lottery.enter(player(3), FEE).unwrap();
        lottery.enter(player(2), FEE).unwrap();

        assert_eq!(
            lottery.ledger.distinct_players(),
            vec![player(3), player(1), player(2)]
        );
    }

    #[test]
    fn info_reflects_live_round() {
        let lottery = calculating_lottery([7u8; 32]);
        let info = lottery.info();
        assert_eq!(info.round_id, 1);
        assert_eq!(info.state, LotteryState::Calculating);
        assert_eq!(info.entrance_fee, FEE);
        assert_eq!(info.interval, INTERVAL);
        assert_eq!(info.opened_at, OPENED_AT);
        assert_eq!(info.number_of_players, 2);
        assert_eq!(info.balance, 2 * FEE);
        assert_eq!(info.recent_winner, None);
        assert_eq!(info.pending_request_id, Some([7u8; 32]));
    }
}
