//! End-to-end retarget scenarios.
//!
//! Exercises the public retarget entry points over whole chains with known
//! expected compact bits, complementing the per-module unit tests.

use crate::chain::{BlockMetadata, ChainView, HeightIndexedView};
use crate::chain_params::{ConsensusParams, ConsensusParamsConfig};
use crate::compact::{decode_compact, encode_compact};
use crate::difficulty::{classic_retarget, lwma_retarget, next_required_target};
use crate::params::{LWMA_WEIGHT, LWMA_WINDOW};

const T0: i64 = 1_600_000_000;

fn sixty_second_params() -> ConsensusParams {
    ConsensusParams::from_config(&ConsensusParamsConfig {
        pow_limit_bits: Some(0x1d00ffff),
        target_spacing_secs: Some(60),
        target_timespan_secs: Some(3_600),
        allow_min_difficulty_blocks: Some(false),
        no_retargeting: Some(false),
        lwma_activation_height: Some(0),
    })
    .unwrap()
}

/// Per-term window divisor, as the LWMA applies it.
fn lwma_divisor() -> u64 {
    (LWMA_WEIGHT as u64) * u64::from(LWMA_WINDOW) * u64::from(LWMA_WINDOW)
}

#[test]
fn test_classic_on_target_interval_returns_same_bits() {
    let params = ConsensusParams::mainnet();
    let last = BlockMetadata {
        height: 2015,
        timestamp: T0 + 2016 * 600,
        bits: 0x1d00ffff,
    };

    assert_eq!(classic_retarget(&last, T0, &params), 0x1d00ffff);
}

#[test]
fn test_classic_eighth_timespan_clamps_to_quarter_target() {
    let params = ConsensusParams::mainnet();
    let last = BlockMetadata {
        height: 2015,
        timestamp: T0 + 2016 * 600 / 8,
        bits: 0x1d00ffff,
    };

    let bits = classic_retarget(&last, T0, &params);
    assert_eq!(bits, 0x1c3fffc0);

    // The quartered target re-encodes losslessly.
    let quarter = decode_compact(0x1d00ffff).target / 4u32;
    assert_eq!(decode_compact(bits).target, quarter);
    assert_eq!(encode_compact(&quarter), bits);
}

#[test]
fn test_classic_boundary_through_dispatcher() {
    let params = ConsensusParams::mainnet();
    let mut chain = HeightIndexedView::new();
    for i in 0..2015 {
        chain.append(T0 + i * 600, 0x1c123456);
    }
    // Tip timestamp makes the interval span exactly the target timespan.
    chain.append(T0 + 2016 * 600, 0x1c123456);
    let last = chain.tip().unwrap();
    assert_eq!(last.height, 2015);

    let bits = next_required_target(&chain, &last, last.timestamp + 600, &params).unwrap();
    assert_eq!(bits, 0x1c123456);
}

#[test]
fn test_lwma_steady_state_approximates_window_target() {
    let params = sixty_second_params();
    let window_bits = 0x1c123456;
    let mut chain = HeightIndexedView::new();
    for i in 0..100 {
        chain.append(T0 + i * 60, window_bits);
    }
    let last = chain.tip().unwrap();

    let bits = lwma_retarget(&chain, &last, &params).unwrap();

    // With every solvetime exactly on target, the weighted sum is
    // N * (N + 1) / 2 * spacing, and the output reproduces the window
    // target up to the rounding of the per-term division.
    let n = u64::from(LWMA_WINDOW);
    let t = n * (n + 1) / 2 * 60;
    let per_term = decode_compact(window_bits).target / lwma_divisor();
    let expected = encode_compact(&(per_term * n * t));
    assert_eq!(bits, expected);

    // Fixed point up to integer rounding: within 1% of the window target.
    let target = decode_compact(window_bits).target;
    let out = decode_compact(bits).target;
    assert!(out >= target, "steady state never hardens");
    assert!(out <= &target * 101u32 / 100u32, "steady state stays within 1%");
}

#[test]
fn test_lwma_floor_clamp_on_negative_solvetimes() {
    let params = sixty_second_params();
    let window_bits = 0x1c123456;
    let mut chain = HeightIndexedView::new();
    // Timestamps strictly decreasing: every solvetime in the window is
    // maximally negative for this schedule.
    for i in 0..100 {
        chain.append(T0 - i * 600, window_bits);
    }
    let last = chain.tip().unwrap();

    let bits = lwma_retarget(&chain, &last, &params).unwrap();

    // The weighted sum clamps at N * k / 3.
    let n = u64::from(LWMA_WINDOW);
    let floor = n * (LWMA_WEIGHT as u64) / 3;
    let per_term = decode_compact(window_bits).target / lwma_divisor();
    let expected = encode_compact(&(per_term * n * floor));
    assert_eq!(bits, expected);

    // Roughly a third of the window target: strictly harder.
    let out = decode_compact(bits).target;
    assert!(out < decode_compact(window_bits).target);
}

#[test]
fn test_lwma_slow_blocks_raise_target_to_limit_at_most() {
    let params = sixty_second_params();
    let mut chain = HeightIndexedView::new();
    // Ten-fold slowdown near the limit: the raised target clamps at the
    // proof-of-work limit.
    for i in 0..100 {
        chain.append(T0 + i * 6_000, 0x1d00ffff);
    }
    let last = chain.tip().unwrap();

    let bits = lwma_retarget(&chain, &last, &params).unwrap();
    assert_eq!(bits, params.pow_limit_bits);

    let out = decode_compact(bits).target;
    assert!(out <= *params.pow_limit());
}

#[test]
fn test_full_chain_crossing_lwma_activation() {
    // Classic rules before activation, LWMA from the activation height on,
    // over one contiguous chain.
    let params = ConsensusParams::from_config(&ConsensusParamsConfig {
        pow_limit_bits: Some(0x1d00ffff),
        target_spacing_secs: Some(60),
        target_timespan_secs: Some(3_600),
        allow_min_difficulty_blocks: Some(false),
        no_retargeting: Some(false),
        lwma_activation_height: Some(80),
    })
    .unwrap();

    let mut chain = HeightIndexedView::new();
    for i in 0..100 {
        chain.append(T0 + i * 60, 0x1c123456);
    }

    // Candidate height 79: classic, non-boundary (79 % 60 != 0), keeps
    // previous bits.
    let below = chain.ancestor(78).unwrap();
    let bits = next_required_target(&chain, &below, below.timestamp + 60, &params).unwrap();
    assert_eq!(bits, 0x1c123456);

    // Candidate height 80: LWMA takes over.
    let at = chain.ancestor(79).unwrap();
    let dispatched = next_required_target(&chain, &at, at.timestamp + 60, &params).unwrap();
    assert_eq!(dispatched, lwma_retarget(&chain, &at, &params).unwrap());
}
