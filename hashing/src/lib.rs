//! SHA-256 over the fixed-layout inputs used in committee and RANDAO computations.
//!
//! Every function hashes the concatenation of its arguments. Integers are encoded little-endian.

use ethereum_types::H256;
use sha2::{Digest as _, Sha256};

fn finish(hasher: Sha256) -> H256 {
    H256(hasher.finalize().into())
}

/// Used to compute the pivot of a shuffling round.
#[inline]
#[must_use]
pub fn hash_256_8(seed: H256, round: u8) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update([round]);
    finish(hasher)
}

/// Used to compute the source of swap bits for a window of 256 positions.
#[inline]
#[must_use]
pub fn hash_256_8_32(seed: H256, round: u8, position_window: u32) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update([round]);
    hasher.update(position_window.to_le_bytes());
    finish(hasher)
}

/// Used to derive an epoch seed from a domain type, the epoch and a RANDAO mix.
#[inline]
#[must_use]
pub fn hash_32_64_256(domain_type: [u8; 4], epoch: u64, mix: H256) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(domain_type);
    hasher.update(epoch.to_le_bytes());
    hasher.update(mix);
    finish(hasher)
}

/// Merkleizes two chunks. Used for fork data roots and signing roots.
#[inline]
#[must_use]
pub fn hash_256_256(left: H256, right: H256) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    finish(hasher)
}

// This is only ever called with `SignatureBytes`,
// but that can't be the type of the parameter due to a circular dependency.
#[inline]
#[must_use]
pub fn hash_768(bytes: impl AsRef<[u8; 96]>) -> H256 {
    finish(Sha256::new_with_prefix(bytes.as_ref()))
}
