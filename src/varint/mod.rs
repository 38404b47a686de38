// Variable-length integer codec for 64-bit values.
//
// # Modules
//
// - `unsigned` - base-128 groups, least-significant first
// - `zigzag`   - signed values mapped onto the unsigned codec
// - `stream`   - concatenated groups, segmentation and batch encode/decode
// - `error`    - `VarIntError`

pub mod error;
pub mod stream;
pub mod unsigned;
pub mod zigzag;

// Re-export key items for convenience.
pub use error::VarIntError;
pub use stream::{
    Group, Groups, TrailingGroup, ValueKind, Values, count_groups, decode_i64_stream,
    decode_i64_stream_with, decode_stream, decode_u64_stream, decode_u64_stream_with,
    encode_i64_stream, encode_u64_stream,
};
#[cfg(feature = "parallel")]
pub use stream::{encode_i64_stream_par, encode_u64_stream_par};
pub use unsigned::{
    CONT_MASK, MAX_VARINT_LEN, PAYLOAD_BITS, PAYLOAD_MASK, append_u64, decode_u64, encode_u64,
    encode_u64_to_vec, encoded_len_u64, read_u64,
};
pub use zigzag::{
    append_i64, decode_i64, encode_i64, encode_i64_to_vec, encoded_len_i64, read_i64,
    zigzag_decode, zigzag_encode,
};
