/// Distinct players per round. Every one of them rides along in the VRF
/// callback transaction, so this is bounded by the transaction size.
pub const MAX_PLAYERS: usize = 20;

/// Entries per round, repeat entries included.
pub const MAX_ENTRIES: usize = 64;

pub const SEED_LOTTERY: &[u8] = b"lottery";
pub const SEED_IDENTITY: &[u8] = b"identity";

/// Domain tag mixed into every request id.
pub const REQUEST_ID_DOMAIN: &[u8] = b"lottery-request";

/// Leading randomness bytes folded into the winner index.
pub const RANDOMNESS_BYTES_CONSUMED: usize = 16;
