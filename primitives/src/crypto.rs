//! Content hashing for deployed contract code.

use sha3::{Digest, Sha3_256};

use crate::types::Hash;

/// SHA3-256 of contract code, as carried in the `codeHash` field of the
/// contract events.
pub fn code_hash(code: &[u8]) -> Hash {
    let result = Sha3_256::digest(code);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
