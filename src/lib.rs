//! # ember-consensus
//!
//! Proof-of-work consensus rules for the Ember blockchain.
//!
//! This crate provides:
//! - Difficulty retargeting (classic periodic interval and per-block LWMA)
//! - Compact "nBits" target encoding and decoding
//! - Proof-of-work validation against a decoded target
//! - Network-specific consensus parameters
//!
//! ## Retargeting
//!
//! Two algorithms are active over the chain's lifetime, selected purely by
//! block height. Below the LWMA activation height the classic algorithm
//! recomputes the target once per full adjustment interval from the interval's
//! elapsed timespan, clamped to a 4x swing. From the activation height onward
//! a linearly-weighted moving average over the last 45 blocks recomputes the
//! target for every block.
//!
//! All retarget arithmetic is exact big-integer math. The multiply-then-divide
//! order and the per-term division inside the LWMA window are part of the
//! consensus rules; reordering them changes integer rounding and forks the
//! chain.
//!
//! ## Purity
//!
//! Every operation here is a pure, bounded computation over an immutable
//! snapshot of chain ancestry and a read-only [`ConsensusParams`]. Nothing is
//! cached or mutated, so concurrent calls from validation and mining threads
//! are safe as long as the host keeps the traversed portion of its chain
//! index stable for the duration of a call.

mod chain;
mod chain_params;
mod compact;
mod difficulty;
mod error;
mod pow;

#[cfg(test)]
mod retarget_test_vectors;

pub use chain::{BlockMetadata, ChainView, HeightIndexedView};
pub use chain_params::{ConsensusParams, ConsensusParamsConfig, ParamsError};
pub use compact::{decode_compact, encode_compact, DecodedTarget};
pub use difficulty::{classic_retarget, lwma_retarget, next_required_target};
pub use error::{ConsensusError, ConsensusResult};
pub use pow::check_proof_of_work;

/// Design constants of the retargeting algorithms.
///
/// These are properties of the consensus rules themselves, not per-network
/// configuration; changing any of them is a hard fork.
pub mod params {
    /// Number of blocks in the LWMA averaging window (N).
    ///
    /// The LWMA algorithm is undefined below chain height N + 1; the
    /// activation height must keep it out of reach until then.
    pub const LWMA_WINDOW: u32 = 45;

    /// LWMA solvetime weight constant (k).
    ///
    /// Derived as `(N + 1) / 2 * target_spacing * 0.998`, rounded, for the
    /// 60-second spacing the algorithm was tuned against.
    pub const LWMA_WEIGHT: i64 = 1377;

    /// Mining gap, in multiples of the target spacing, beyond which
    /// min-difficulty networks may accept a block at the proof-of-work limit.
    pub const MIN_DIFFICULTY_GAP: i64 = 2;
}
