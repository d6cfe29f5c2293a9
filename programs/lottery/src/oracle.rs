use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};
use anchor_lang::Discriminator;
use ephemeral_vrf_sdk::instructions::{create_request_randomness_ix, RequestRandomnessParams};
use ephemeral_vrf_sdk::types::SerializableAccountMeta;

use crate::{
    constants::{REQUEST_ID_DOMAIN, SEED_IDENTITY},
    errors::ErrorCode,
};

// MagicBlock VRF program constants
const VRF_PROGRAM_ID_BYTES: [u8; 32] = ephemeral_vrf_sdk::consts::VRF_PROGRAM_ID.to_bytes();
const DEFAULT_QUEUE_BYTES: [u8; 32] = ephemeral_vrf_sdk::consts::DEFAULT_QUEUE.to_bytes();
const VRF_PROGRAM_IDENTITY_BYTES: [u8; 32] =
    ephemeral_vrf_sdk::consts::VRF_PROGRAM_IDENTITY.to_bytes();

pub static VRF_PROGRAM_ID: Pubkey = Pubkey::new_from_array(VRF_PROGRAM_ID_BYTES);
pub static DEFAULT_QUEUE: Pubkey = Pubkey::new_from_array(DEFAULT_QUEUE_BYTES);
/// Only the VRF program can sign as this address.
pub static VRF_PROGRAM_IDENTITY: Pubkey = Pubkey::new_from_array(VRF_PROGRAM_IDENTITY_BYTES);

/// Convert an anchor Pubkey to the SDK's Pubkey (same 32 bytes, different crate).
fn to_sdk_pubkey(p: &Pubkey) -> ephemeral_vrf_sdk::Pubkey {
    ephemeral_vrf_sdk::Pubkey::new_from_array(p.to_bytes())
}

/// Correlation token for the `request_nonce`-th request of `lottery`.
/// Doubles as the VRF caller seed.
pub fn derive_request_id(lottery: &Pubkey, request_nonce: u64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(REQUEST_ID_DOMAIN);
    hasher.update(lottery.as_ref());
    hasher.update(&request_nonce.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Accounts the oracle hands back to `fulfill_randomness`, after its own
/// identity signer: the lottery, the request ticket whose address is the
/// request id, then every distinct entrant so the winner can be credited.
pub fn callback_accounts(
    lottery: &Pubkey,
    request_id: &[u8; 32],
    players: &[Pubkey],
) -> Vec<SerializableAccountMeta> {
    let mut metas = Vec::with_capacity(players.len() + 2);
    metas.push(SerializableAccountMeta {
        pubkey: to_sdk_pubkey(lottery),
        is_signer: false,
        is_writable: true,
    });
    metas.push(SerializableAccountMeta {
        pubkey: ephemeral_vrf_sdk::Pubkey::new_from_array(*request_id),
        is_signer: false,
        is_writable: false,
    });
    metas.extend(players.iter().map(|player| SerializableAccountMeta {
        pubkey: to_sdk_pubkey(player),
        is_signer: false,
        is_writable: true,
    }));
    metas
}

pub struct RandomnessRequest<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub program_identity: &'a AccountInfo<'info>,
    pub identity_bump: u8,
    pub oracle_queue: &'a AccountInfo<'info>,
    pub slot_hashes: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
}

impl<'a, 'info> RandomnessRequest<'a, 'info> {
    /// Issues one VRF request. The oracle answers later through
    /// `fulfill_randomness`; nothing is buffered or retried here.
    pub fn send(
        &self,
        request_id: [u8; 32],
        callback_accounts: Vec<SerializableAccountMeta>,
    ) -> Result<()> {
        let sdk_ix = create_request_randomness_ix(RequestRandomnessParams {
            payer: to_sdk_pubkey(self.payer.key),
            oracle_queue: to_sdk_pubkey(self.oracle_queue.key),
            callback_program_id: to_sdk_pubkey(&crate::ID),
            callback_discriminator: crate::instruction::FulfillRandomness::DISCRIMINATOR.to_vec(),
            caller_seed: request_id,
            accounts_metas: Some(callback_accounts),
            ..Default::default()
        });

        // Manually convert the SDK instruction to anchor's solana_program types.
        let ix = Instruction {
            program_id: Pubkey::new_from_array(sdk_ix.program_id.to_bytes()),
            accounts: sdk_ix
                .accounts
                .iter()
                .map(|a| {
                    let pubkey = Pubkey::new_from_array(a.pubkey.to_bytes());
                    if a.is_writable {
                        AccountMeta::new(pubkey, a.is_signer)
                    } else {
                        AccountMeta::new_readonly(pubkey, a.is_signer)
                    }
                })
                .collect(),
            data: sdk_ix.data,
        };

        invoke_signed(
            &ix,
            &[
                self.payer.clone(),
                self.program_identity.clone(),
                self.oracle_queue.clone(),
                self.slot_hashes.clone(),
                self.system_program.clone(),
            ],
            &[&[SEED_IDENTITY, &[self.identity_bump]]],
        )
        .map_err(|err| {
            msg!("VRF request failed: {}", err);
            error!(ErrorCode::RequestFailed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_deterministic_and_unique() {
        let lottery = Pubkey::new_from_array([4u8; 32]);
        let other = Pubkey::new_from_array([5u8; 32]);

        assert_eq!(derive_request_id(&lottery, 0), derive_request_id(&lottery, 0));
        assert_ne!(derive_request_id(&lottery, 0), derive_request_id(&lottery, 1));
        assert_ne!(derive_request_id(&lottery, 0), derive_request_id(&other, 0));
        assert_ne!(derive_request_id(&lottery, 0), [0u8; 32]);
    }

    #[test]
    fn callback_accounts_carry_ticket_and_players() {
        let lottery = Pubkey::new_from_array([4u8; 32]);
        let request_id = derive_request_id(&lottery, 3);
        let players = [Pubkey::new_from_array([1u8; 32]), Pubkey::new_from_array([2u8; 32])];

        let metas = callback_accounts(&lottery, &request_id, &players);
        assert_eq!(metas.len(), 4);

        assert_eq!(metas[0].pubkey.to_bytes(), lottery.to_bytes());
        assert!(metas[0].is_writable);

        assert_eq!(metas[1].pubkey.to_bytes(), request_id);
        assert!(!metas[1].is_writable);

        for (meta, player) in metas[2..].iter().zip(players.iter()) {
            assert_eq!(meta.pubkey.to_bytes(), player.to_bytes());
            assert!(meta.is_writable);
            assert!(!meta.is_signer);
        }
    }
}
