// Unsigned base-128 variable-length integers (LEB128 style).
//
// Least-significant group first. Each byte carries 7 payload bits; bit 7 is
// set on every byte except the last one of a group. Zero encodes as a single
// 0x00 byte, and encodings are always minimal.

use super::error::VarIntError;

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

/// Payload bits carried by each byte.
pub const PAYLOAD_BITS: usize = 7;

/// Low 7 bits of a byte: the value payload.
pub const PAYLOAD_MASK: u8 = 0x7F;

/// High bit of a byte: set when more bytes of the group follow.
pub const CONT_MASK: u8 = 0x80;

/// Largest payload the 10th byte may carry. Only bit 63 is left by then.
const LAST_BYTE_MAX_PAYLOAD: u8 = 0x01;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u64` into the front of `buf`.
/// Returns the number of bytes written (1..=10).
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let byte = num as u8 & PAYLOAD_MASK;
        num >>= PAYLOAD_BITS;
        if num == 0 {
            buf[i] = byte;
            return i + 1;
        }
        buf[i] = byte | CONT_MASK;
        i += 1;
    }
}

/// Encode a `u64` and append it to `out`. Returns the number of bytes added.
#[inline]
pub fn append_u64(out: &mut Vec<u8>, num: u64) -> usize {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    out.extend_from_slice(&buf[..len]);
    len
}

/// Encode a `u64` into a freshly allocated buffer.
pub fn encode_u64_to_vec(num: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len_u64(num));
    append_u64(&mut out, num);
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode the varint group at the front of `data`.
/// Returns `(value, bytes_consumed)`; bytes after the group are ignored.
///
/// A group that would need more than 10 bytes, or whose 10th byte carries
/// anything besides bit 63, is rejected as [`VarIntError::Overflow`].
/// Non-minimal groups such as `[0x80, 0x00]` are accepted.
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), VarIntError> {
    if data.is_empty() {
        return Err(VarIntError::InvalidInput("empty varint group"));
    }
    let mut val: u64 = 0;
    for (i, &byte) in data.iter().enumerate() {
        let payload = byte & PAYLOAD_MASK;
        if i == MAX_VARINT_LEN - 1 && (payload > LAST_BYTE_MAX_PAYLOAD || byte & CONT_MASK != 0) {
            return Err(VarIntError::Overflow { offset: 0 });
        }
        val |= u64::from(payload) << (i * PAYLOAD_BITS);
        if byte & CONT_MASK == 0 {
            return Ok((val, i + 1));
        }
    }
    Err(VarIntError::TruncatedGroup { offset: 0 })
}

/// Decode a buffer holding exactly one complete varint group.
pub fn decode_u64(data: &[u8]) -> Result<u64, VarIntError> {
    let (val, len) = read_u64(data)?;
    if len != data.len() {
        return Err(VarIntError::InvalidInput("trailing bytes after varint group"));
    }
    Ok(val)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the encoded byte-length of a `u64` value.
#[inline]
pub fn encoded_len_u64(num: u64) -> usize {
    let bits = 64 - num.leading_zeros();
    bits.max(1).div_ceil(PAYLOAD_BITS as u32) as usize
}

/// True when `byte` terminates a group.
#[inline]
pub fn is_last_byte(byte: u8) -> bool {
    byte & CONT_MASK == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
