//! Difficulty retargeting.
//!
//! Two algorithms are active over the chain's lifetime, selected by block
//! height:
//!
//! - **Classic**: recomputes the target once per adjustment interval from the
//!   interval's elapsed timespan, clamped to a 4x swing in either direction.
//! - **LWMA**: recomputes the target every block from a linearly-weighted
//!   moving average of the last 45 solvetimes, weighing recent blocks more.
//!
//! Both honor the test-network escape rules: `no_retargeting` freezes the
//! previous target, and `allow_min_difficulty_blocks` permits a block at the
//! proof-of-work limit when mining has stalled past twice the target spacing.
//!
//! The LWMA weighted solvetime sum has a floor clamp (`N * k / 3`) against
//! anomalous timestamps but no ceiling; a window of far-future timestamps can
//! raise the computed target all the way to the proof-of-work limit. The
//! asymmetry is part of the consensus rules and is preserved as is.

use crate::chain::{BlockMetadata, ChainView};
use crate::chain_params::ConsensusParams;
use crate::compact::{decode_compact, encode_compact};
use crate::params::{LWMA_WEIGHT, LWMA_WINDOW, MIN_DIFFICULTY_GAP};
use crate::{ConsensusError, ConsensusResult};
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

/// Compute the compact target a candidate block must satisfy.
///
/// # Arguments
/// * `chain` - Ancestry view of the chain ending at `last`
/// * `last` - The last accepted block
/// * `candidate_timestamp` - Timestamp of the candidate block, Unix seconds
/// * `params` - Network consensus parameters
///
/// Pure: the result depends only on the arguments and the ancestor metadata
/// the view resolves. Errors indicate a corrupted chain index or
/// misconfigured activation height, never a property of the candidate.
pub fn next_required_target<C: ChainView>(
    chain: &C,
    last: &BlockMetadata,
    candidate_timestamp: i64,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    let height = last.height + 1;
    if height >= params.lwma_activation_height {
        lwma_next_target(chain, last, candidate_timestamp, params)
    } else {
        classic_next_target(chain, last, candidate_timestamp, params)
    }
}

/// Classic periodic retargeting, with the test-network special rules.
fn classic_next_target<C: ChainView>(
    chain: &C,
    last: &BlockMetadata,
    candidate_timestamp: i64,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    let interval = params.difficulty_adjustment_interval(last.height);

    // Only change once per difficulty adjustment interval.
    if (last.height + 1) % interval != 0 {
        if params.allow_min_difficulty_blocks {
            if candidate_timestamp
                > last.timestamp + MIN_DIFFICULTY_GAP * params.target_spacing
            {
                debug!(
                    height = last.height + 1,
                    "min-difficulty escape: mining gap exceeded"
                );
                return Ok(params.pow_limit_bits);
            }
            // Skip back past the run of min-difficulty blocks to the last
            // real target.
            let mut block = *last;
            while block.height > 0
                && block.height % interval != 0
                && block.bits == params.pow_limit_bits
            {
                block = chain
                    .ancestor(block.height - 1)
                    .ok_or(ConsensusError::MissingAncestor {
                        height: block.height - 1,
                        tip: last.height,
                    })?;
            }
            return Ok(block.bits);
        }
        return Ok(last.bits);
    }

    // First block of the just-completed interval.
    let first_height = last.height.checked_sub(interval - 1).ok_or(
        ConsensusError::IntervalStartBelowGenesis {
            last_height: last.height,
            interval,
        },
    )?;
    let first = chain
        .ancestor(first_height)
        .ok_or(ConsensusError::MissingAncestor {
            height: first_height,
            tip: last.height,
        })?;

    Ok(classic_retarget(last, first.timestamp, params))
}

/// Classic interval retarget from the interval's elapsed timespan.
///
/// The timespan is clamped to `[timespan/4, timespan*4]` with truncating
/// signed division, bounding the difficulty swing to 4x per interval. The
/// new target is `decode(last.bits) * actual / timespan`, multiply first,
/// clamped to the proof-of-work limit.
pub fn classic_retarget(
    last: &BlockMetadata,
    first_block_time: i64,
    params: &ConsensusParams,
) -> u32 {
    if params.no_retargeting {
        return last.bits;
    }

    let timespan = params.target_timespan(last.height);

    // Limit adjustment step.
    let mut actual = last.timestamp - first_block_time;
    if actual < timespan / 4 {
        actual = timespan / 4;
    }
    if actual > timespan * 4 {
        actual = timespan * 4;
    }

    let mut new_target = decode_compact(last.bits).target;
    new_target *= actual as u64;
    new_target /= timespan as u64;
    if new_target > *params.pow_limit() {
        new_target = params.pow_limit().clone();
    }

    let bits = encode_compact(&new_target);
    debug!(
        height = last.height,
        actual_timespan = actual,
        new_bits = format!("0x{:08x}", bits),
        "classic retarget at interval boundary"
    );
    bits
}

/// LWMA retargeting, with the test-network mining-gap escape applied first.
fn lwma_next_target<C: ChainView>(
    chain: &C,
    last: &BlockMetadata,
    candidate_timestamp: i64,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    if params.allow_min_difficulty_blocks
        && candidate_timestamp > last.timestamp + MIN_DIFFICULTY_GAP * params.target_spacing
    {
        debug!(
            height = last.height + 1,
            "min-difficulty escape: mining gap exceeded"
        );
        return Ok(params.pow_limit_bits);
    }
    lwma_retarget(chain, last, params)
}

/// Linearly-weighted moving average retarget over the last `N` blocks.
///
/// Solvetimes are signed and flow through unrejected; the weighted sum is
/// floor-clamped at `N * k / 3`. Each window target is divided by `k * N * N`
/// before summation to keep the running sum inside 256 bits.
///
/// Undefined below chain height `N + 1`; invoking it there is an activation
/// misconfiguration and yields an error.
pub fn lwma_retarget<C: ChainView>(
    chain: &C,
    last: &BlockMetadata,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    if params.no_retargeting {
        return Ok(last.bits);
    }

    let n = LWMA_WINDOW;
    let height = last.height + 1;
    if height <= n {
        return Err(ConsensusError::LwmaBelowWindow { height, window: n });
    }

    let divisor = (LWMA_WEIGHT as u64) * u64::from(n) * u64::from(n);

    let mut sum_target = BigUint::zero();
    let mut t: i64 = 0;
    let mut j: i64 = 0;

    let mut prev = chain
        .ancestor(height - n - 1)
        .ok_or(ConsensusError::MissingAncestor {
            height: height - n - 1,
            tip: last.height,
        })?;

    // Loop through the N most recent blocks, oldest first.
    for i in (height - n)..height {
        let block = chain
            .ancestor(i)
            .ok_or(ConsensusError::MissingAncestor {
                height: i,
                tip: last.height,
            })?;

        let solvetime = block.timestamp - prev.timestamp;
        j += 1;
        t += solvetime * j;
        sum_target += decode_compact(block.bits).target / divisor;
        prev = block;
    }

    // Keep t reasonable in case strange solvetimes occurred.
    let floor = i64::from(n) * LWMA_WEIGHT / 3;
    if t < floor {
        t = floor;
    }

    let mut next_target = sum_target * (t as u64);
    if next_target > *params.pow_limit() {
        next_target = params.pow_limit().clone();
    }

    let bits = encode_compact(&next_target);
    debug!(
        height,
        weighted_solvetime = t,
        new_bits = format!("0x{:08x}", bits),
        "LWMA retarget"
    );
    Ok(bits)
}
