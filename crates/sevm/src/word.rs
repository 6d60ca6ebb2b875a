//! 256-bit word arithmetic.
//!
//! Every value on the stack is a [`U256`]. Unsigned operations wrap modulo 2^256 and are provided
//! by [`ruint`](alloy_primitives::ruint) directly. Signed division, remainder and comparison are
//! re-exported from `revm-interpreter`; this module adds the EVM-specific bit manipulations that
//! have no direct `ruint` counterpart.

use alloy_primitives::U256;

pub use revm_interpreter::instructions::i256::{
    i256_cmp, i256_div, i256_mod, i256_sign, Sign, MAX_POSITIVE_VALUE as I256_MAX,
    MIN_NEGATIVE_VALUE as I256_MIN,
};

/// `SIGNEXTEND`: extends the sign of `x` from byte `k`, counting from the least significant byte.
///
/// `k >= 31` returns `x` unchanged.
pub fn signextend(k: U256, x: U256) -> U256 {
    if k >= U256::from(31) {
        return x;
    }
    let bit = k.to::<usize>() * 8 + 7;
    let mask = (U256::from(1) << bit).wrapping_sub(U256::from(1));
    if x.bit(bit) {
        x | !mask
    } else {
        x & mask
    }
}

/// `BYTE`: returns byte `i` of `x`, where byte 0 is the most significant one.
pub fn byte(i: U256, x: U256) -> U256 {
    match as_usize(i) {
        Some(i) if i < 32 => U256::from(x.byte(31 - i)),
        _ => U256::ZERO,
    }
}

/// `SHL`: logical left shift. Shifts of 256 or more produce zero.
pub fn shl(shift: U256, x: U256) -> U256 {
    match shift_amount(shift) {
        Some(s) => x << s,
        None => U256::ZERO,
    }
}

/// `SHR`: logical right shift. Shifts of 256 or more produce zero.
pub fn shr(shift: U256, x: U256) -> U256 {
    match shift_amount(shift) {
        Some(s) => x >> s,
        None => U256::ZERO,
    }
}

/// `SAR`: arithmetic right shift, filling with the sign bit.
pub fn sar(shift: U256, x: U256) -> U256 {
    let negative = x.bit(255);
    match shift_amount(shift) {
        Some(s) if negative => !((!x) >> s),
        Some(s) => x >> s,
        None if negative => U256::MAX,
        None => U256::ZERO,
    }
}

#[inline]
fn shift_amount(shift: U256) -> Option<usize> {
    as_usize(shift).filter(|&s| s < 256)
}

/// Converts a word to a `usize`, returning `None` if it does not fit.
#[inline]
pub fn as_usize(x: U256) -> Option<usize> {
    usize::try_from(x).ok()
}

/// Converts a word to a `usize`, saturating at `usize::MAX`.
#[inline]
pub fn as_usize_saturated(x: U256) -> usize {
    as_usize(x).unwrap_or(usize::MAX)
}

/// Reads a 32-byte big-endian word from `data` at `offset`, zero-padding past the end.
pub fn read_padded(data: &[u8], offset: usize) -> U256 {
    let mut word = [0u8; 32];
    if offset < data.len() {
        let end = data.len().min(offset.saturating_add(32));
        word[..end - offset].copy_from_slice(&data[offset..end]);
    }
    U256::from_be_bytes(word)
}
