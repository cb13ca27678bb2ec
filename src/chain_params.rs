//! Network-specific consensus parameters.
//!
//! Parameters are fixed at process start and passed explicitly into every
//! consensus call; nothing here is ambient or mutable. Built-in networks are
//! available through [`ConsensusParams::mainnet`], [`ConsensusParams::testnet`]
//! and [`ConsensusParams::regtest`]; custom networks load through
//! [`ConsensusParams::from_config`], which validates each field and names the
//! offending one on failure.

use crate::compact::decode_compact;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error when constructing ConsensusParams from configuration.
#[derive(Debug, Clone)]
pub struct ParamsError {
    /// The field that is missing or invalid.
    pub field: &'static str,
    /// Description of the error.
    pub message: String,
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConsensusParams error for '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for ParamsError {}

/// Configuration for loading ConsensusParams from TOML/JSON.
///
/// All fields are optional so partial configs can be validated with clear
/// errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsensusParamsConfig {
    /// Proof-of-work limit as compact bits.
    pub pow_limit_bits: Option<u32>,
    /// Target seconds between blocks.
    pub target_spacing_secs: Option<i64>,
    /// Seconds per classic retarget interval.
    pub target_timespan_secs: Option<i64>,
    /// Permit min-difficulty blocks during mining gaps (test networks).
    pub allow_min_difficulty_blocks: Option<bool>,
    /// Disable retargeting entirely (test networks).
    pub no_retargeting: Option<bool>,
    /// Height at which LWMA replaces the classic algorithm.
    pub lwma_activation_height: Option<u32>,
}

/// Network-specific consensus parameters.
///
/// Immutable once constructed. The decoded proof-of-work limit is cached at
/// construction so retarget calls never re-decode it.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
    /// Decoded proof-of-work limit (the easiest allowed target).
    pow_limit: BigUint,
    /// Proof-of-work limit as compact bits.
    pub pow_limit_bits: u32,
    /// Target seconds between blocks.
    pub target_spacing: i64,
    /// Seconds per classic retarget interval.
    pow_target_timespan: i64,
    /// Permit min-difficulty blocks during mining gaps (test networks).
    pub allow_min_difficulty_blocks: bool,
    /// Disable retargeting entirely (test networks).
    pub no_retargeting: bool,
    /// Height at/after which LWMA replaces the classic algorithm.
    pub lwma_activation_height: u32,
}

impl ConsensusParams {
    /// Mainnet parameters.
    pub fn mainnet() -> Self {
        Self::build(
            0x1d00ffff,
            600,
            14 * 24 * 60 * 60,
            false,
            false,
            100_800,
        )
        .expect("mainnet parameters are valid")
    }

    /// Testnet parameters: mainnet rules with the min-difficulty escape.
    pub fn testnet() -> Self {
        Self::build(
            0x1d00ffff,
            600,
            14 * 24 * 60 * 60,
            true,
            false,
            100_800,
        )
        .expect("testnet parameters are valid")
    }

    /// Regtest parameters: trivial limit, fixed difficulty, LWMA from genesis.
    pub fn regtest() -> Self {
        Self::build(0x207fffff, 600, 14 * 24 * 60 * 60, true, true, 0)
            .expect("regtest parameters are valid")
    }

    /// Create ConsensusParams from configuration.
    ///
    /// Returns an error naming the specific field if any required field is
    /// missing or invalid.
    pub fn from_config(config: &ConsensusParamsConfig) -> Result<Self, ParamsError> {
        Self::build(
            config.pow_limit_bits.ok_or(ParamsError {
                field: "pow_limit_bits",
                message: "required field missing".to_string(),
            })?,
            config.target_spacing_secs.ok_or(ParamsError {
                field: "target_spacing_secs",
                message: "required field missing".to_string(),
            })?,
            config.target_timespan_secs.ok_or(ParamsError {
                field: "target_timespan_secs",
                message: "required field missing".to_string(),
            })?,
            config.allow_min_difficulty_blocks.unwrap_or(false),
            config.no_retargeting.unwrap_or(false),
            config.lwma_activation_height.ok_or(ParamsError {
                field: "lwma_activation_height",
                message: "required field missing".to_string(),
            })?,
        )
    }

    fn build(
        pow_limit_bits: u32,
        target_spacing: i64,
        pow_target_timespan: i64,
        allow_min_difficulty_blocks: bool,
        no_retargeting: bool,
        lwma_activation_height: u32,
    ) -> Result<Self, ParamsError> {
        let decoded = decode_compact(pow_limit_bits);
        if decoded.negative || decoded.overflow {
            return Err(ParamsError {
                field: "pow_limit_bits",
                message: format!("0x{:08x} decodes negative or overflowing", pow_limit_bits),
            });
        }
        if decoded.target.is_zero() {
            return Err(ParamsError {
                field: "pow_limit_bits",
                message: "proof-of-work limit cannot be zero".to_string(),
            });
        }
        if target_spacing <= 0 {
            return Err(ParamsError {
                field: "target_spacing_secs",
                message: "must be positive".to_string(),
            });
        }
        if pow_target_timespan < target_spacing {
            return Err(ParamsError {
                field: "target_timespan_secs",
                message: "must be at least one target spacing".to_string(),
            });
        }
        if pow_target_timespan / target_spacing > i64::from(u32::MAX) {
            return Err(ParamsError {
                field: "target_timespan_secs",
                message: "blocks per retarget interval must fit in 32 bits".to_string(),
            });
        }

        Ok(Self {
            pow_limit: decoded.target,
            pow_limit_bits,
            target_spacing,
            pow_target_timespan,
            allow_min_difficulty_blocks,
            no_retargeting,
            lwma_activation_height,
        })
    }

    /// The decoded proof-of-work limit (the easiest allowed target).
    pub fn pow_limit(&self) -> &BigUint {
        &self.pow_limit
    }

    /// Seconds per classic retarget interval at the given height.
    ///
    /// Takes a height so networks can vary the interval by era; current
    /// networks use a single era and ignore the argument.
    pub fn target_timespan(&self, _height: u32) -> i64 {
        self.pow_target_timespan
    }

    /// Blocks per classic retarget interval at the given height.
    ///
    /// Always at least 1: construction rejects a timespan shorter than one
    /// spacing or an interval wider than 32 bits.
    pub fn difficulty_adjustment_interval(&self, height: u32) -> u32 {
        (self.target_timespan(height) / self.target_spacing) as u32
    }
}
