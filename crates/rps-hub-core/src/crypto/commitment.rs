//! Move commitment construction.
//!
//! The hub contract checks a reveal by recomputing
//! `keccak256(abi.encode(uint8 gameMove, string secret, address player))`
//! and comparing it against the hash submitted with `play`. The payload
//! built here must match that encoding byte for byte.

use crate::game::Move;
use alloy_primitives::{keccak256, Address, B256, U256};

const WORD: usize = 32;

/// Solidity `abi.encode(uint8, string, address)` of the commitment inputs.
///
/// Layout: three head words (move widened to uint256, the 0x60 offset of the
/// string tail, the address left-padded), then the string length word, then
/// the UTF-8 secret bytes zero-padded to a 32-byte multiple.
pub fn commitment_payload(game_move: Move, secret: &str, player: Address) -> Vec<u8> {
    let secret_bytes = secret.as_bytes();
    let mut payload = Vec::with_capacity(4 * WORD + secret_bytes.len().next_multiple_of(WORD));

    payload.extend_from_slice(&U256::from(game_move.wire_value()).to_be_bytes::<WORD>());
    payload.extend_from_slice(&U256::from(3 * WORD).to_be_bytes::<WORD>());
    payload.extend_from_slice(&[0u8; 12]);
    payload.extend_from_slice(player.as_slice());

    payload.extend_from_slice(&U256::from(secret_bytes.len()).to_be_bytes::<WORD>());
    payload.extend_from_slice(secret_bytes);
    let trailing = secret_bytes.len() % WORD;
    if trailing != 0 {
        payload.resize(payload.len() + WORD - trailing, 0);
    }

    payload
}

/// The commitment hash the ledger stores for a committed move
pub fn move_commitment(game_move: Move, secret: &str, player: Address) -> B256 {
    keccak256(commitment_payload(game_move, secret, player))
}

/// Verify that the given move and secret produce this commitment for the player
pub fn verify_move_commitment(
    commit_hash: B256,
    game_move: Move,
    secret: &str,
    player: Address,
) -> bool {
    commit_hash == move_commitment(game_move, secret, player)
}
