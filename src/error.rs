//! Error types for retarget computations.

use thiserror::Error;

/// Consensus computation errors.
///
/// Every variant indicates a corrupted chain index or misconfigured
/// activation parameters on the host side. Data-driven oddities such as
/// non-monotonic timestamps or min-difficulty runs are handled by the
/// retargeting rules and never surface as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// The chain view failed to resolve an in-range ancestor.
    #[error("Ancestor at height {height} missing from chain view (tip height {tip})")]
    MissingAncestor { height: u32, tip: u32 },

    /// The classic retarget interval would begin below the genesis block.
    #[error("Retarget interval start below genesis: last height {last_height}, interval {interval}")]
    IntervalStartBelowGenesis { last_height: u32, interval: u32 },

    /// LWMA was invoked before the chain is tall enough to fill its window.
    #[error("LWMA invoked at height {height}, below its {window}-block window")]
    LwmaBelowWindow { height: u32, window: u32 },
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
