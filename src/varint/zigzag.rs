// Signed varints via zigzag mapping.
//
// 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ... so small magnitudes of either sign
// stay short on the wire. The mapped value goes through the unsigned codec.

use super::error::VarIntError;
use super::unsigned::{self, MAX_VARINT_LEN};

/// Map a signed value onto the unsigned domain.
#[inline]
pub const fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub const fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

/// Encode an `i64` into the front of `buf`.
/// Returns the number of bytes written (1..=10).
#[inline]
pub fn encode_i64(v: i64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    unsigned::encode_u64(zigzag_encode(v), buf)
}

/// Encode an `i64` and append it to `out`. Returns the number of bytes added.
#[inline]
pub fn append_i64(out: &mut Vec<u8>, v: i64) -> usize {
    unsigned::append_u64(out, zigzag_encode(v))
}

pub fn encode_i64_to_vec(v: i64) -> Vec<u8> {
    unsigned::encode_u64_to_vec(zigzag_encode(v))
}

/// Decode the signed group at the front of `data`.
/// Returns `(value, bytes_consumed)`.
pub fn read_i64(data: &[u8]) -> Result<(i64, usize), VarIntError> {
    let (u, len) = unsigned::read_u64(data)?;
    Ok((zigzag_decode(u), len))
}

/// Decode a buffer holding exactly one complete signed group.
pub fn decode_i64(data: &[u8]) -> Result<i64, VarIntError> {
    unsigned::decode_u64(data).map(zigzag_decode)
}

#[inline]
pub fn encoded_len_i64(v: i64) -> usize {
    unsigned::encoded_len_u64(zigzag_encode(v))
}
