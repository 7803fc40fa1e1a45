//! Reveal secret material.

use rand::RngCore;

/// Minimum accepted secret length, in characters
pub const MIN_SECRET_LEN: usize = 6;

/// Whether a secret is long enough to commit with
pub fn validate_secret(secret: &str) -> bool {
    secret.chars().count() >= MIN_SECRET_LEN
}

/// Generate a fresh random secret: 32 random bytes, hex-encoded
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
