//! API token generation and hashing.

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// API token prefix.
pub const API_TOKEN_PREFIX: &str = "st_";

/// Number of random bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

const API_TOKEN_SECRET_HEX_CHARS: usize = API_TOKEN_SECRET_BYTES * 2;

/// Generate a new bearer token: the prefix followed by 64 lowercase hex characters.
#[must_use]
pub fn generate_api_token() -> String {
    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    let mut token = String::with_capacity(API_TOKEN_PREFIX.len() + API_TOKEN_SECRET_HEX_CHARS);

    token.push_str(API_TOKEN_PREFIX);
    token.push_str(&encode_hex(&secret));

    token
}

/// Whether `token` has the shape of an issued token. Lookups skip malformed tokens.
#[must_use]
pub fn is_well_formed(token: &str) -> bool {
    token.strip_prefix(API_TOKEN_PREFIX).is_some_and(|secret| {
        secret.len() == API_TOKEN_SECRET_HEX_CHARS
            && secret
                .bytes()
                .all(|byte| matches!(byte, b'0'..=b'9' | b'a'..=b'f'))
    })
}

/// Hex SHA-256 digest of the token, which is all storage ever sees.
#[must_use]
pub fn hash_api_token(token: &str) -> String {
    encode_hex(&Sha256::digest(token.as_bytes()))
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
