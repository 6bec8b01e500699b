//! Bearer tokens.
//!
//! A token is 32 random bytes, hex encoded, and is handed to the client
//! exactly once. The store only ever sees its SHA-256 digest.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes per token.
pub const TOKEN_BYTES: usize = 32;

/// Generates a fresh bearer token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-256 of a presented token, the form under which it is stored.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
