//! Commitment construction and secret material.
//!
//! This module provides:
//! - the keccak256 move commitment the hub contract verifies on reveal
//! - generation and validation of reveal secrets

mod commitment;
mod secret;

pub use commitment::{commitment_payload, move_commitment, verify_move_commitment};
pub use secret::{generate_secret, validate_secret, MIN_SECRET_LEN};
