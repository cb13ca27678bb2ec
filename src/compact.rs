//! Compact "nBits" target encoding.
//!
//! A 256-bit target is packed into 32 bits as a base-256 floating-point
//! number: `bits = (exponent << 24) | mantissa`, where the mantissa is the
//! top 3 significant bytes of the target and the exponent is its byte
//! length. Bit 23 of the mantissa is a sign bit; a target is never encoded
//! with it set, but arbitrary wire values may carry it.
//!
//! Decoding is total: every 32-bit pattern yields a magnitude plus
//! `negative` and `overflow` flags. A decode with either flag set is invalid
//! for proof-of-work purposes and must fail all subsequent checks.

use num_bigint::BigUint;
use num_traits::Zero;

/// Result of decoding a compact target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTarget {
    /// The decoded magnitude. Exact, even for encodings whose value exceeds
    /// 256 bits; `overflow` marks those.
    pub target: BigUint,
    /// Sign bit was set on a non-zero mantissa.
    pub negative: bool,
    /// The encoding denotes a value wider than 256 bits.
    pub overflow: bool,
}

/// Decode a compact target, reporting sign and overflow flags.
pub fn decode_compact(bits: u32) -> DecodedTarget {
    let exponent = bits >> 24;
    let mantissa = bits & 0x007f_ffff;

    let target = if exponent <= 3 {
        BigUint::from(mantissa >> (8 * (3 - exponent)))
    } else {
        BigUint::from(mantissa) << (8 * (exponent - 3)) as usize
    };

    let negative = mantissa != 0 && (bits & 0x0080_0000) != 0;
    let overflow = mantissa != 0
        && (exponent > 34
            || (mantissa > 0xff && exponent > 33)
            || (mantissa > 0xffff && exponent > 32));

    DecodedTarget {
        target,
        negative,
        overflow,
    }
}

/// Encode a magnitude as a compact target.
///
/// The top three significant bytes are kept; lower bytes are truncated, so
/// the encoding is lossy for magnitudes with more than 3 significant bytes.
/// If bit 23 of the mantissa would be set, the mantissa is shifted down a
/// byte and the exponent bumped, so an unsigned magnitude never encodes
/// with the sign bit. Zero encodes as 0.
pub fn encode_compact(target: &BigUint) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let bytes = target.to_bytes_be();
    let mut exponent = bytes.len() as u32;

    let mut mantissa: u32 = 0;
    for i in 0..3 {
        mantissa <<= 8;
        mantissa |= u32::from(bytes.get(i).copied().unwrap_or(0));
    }

    if mantissa & 0x0080_0000 != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    (exponent << 24) | mantissa
}
