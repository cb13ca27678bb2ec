//! Proof-of-work validation.

use crate::chain_params::ConsensusParams;
use crate::compact::decode_compact;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::trace;

/// Check that a block hash satisfies its claimed compact target.
///
/// The hash bytes are interpreted as a big-endian 256-bit unsigned
/// magnitude. Returns `false` if the target decodes negative, overflowing or
/// zero, exceeds the network's proof-of-work limit, or is strictly below the
/// hash. Total: no input pattern errors or panics.
pub fn check_proof_of_work(hash: &[u8; 32], bits: u32, params: &ConsensusParams) -> bool {
    let decoded = decode_compact(bits);

    // Check range.
    if decoded.negative || decoded.overflow || decoded.target.is_zero() {
        return false;
    }
    if decoded.target > *params.pow_limit() {
        return false;
    }

    // Check proof of work matches claimed amount.
    let hash_value = BigUint::from_bytes_be(hash);
    trace!(
        hash = %hex::encode(hash),
        bits = format!("0x{:08x}", bits),
        "proof-of-work check"
    );
    hash_value <= decoded.target
}
