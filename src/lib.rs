//! Oxivarint: base-128 varint and zigzag encoding for 64-bit integers.
//!
//! The crate provides:
//! - The codec core (`varint`): unsigned and signed single values, plus
//!   streams of back-to-back groups
//! - Buffer and file helpers for big-endian raw value files (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use oxivarint::varint;
//!
//! assert_eq!(varint::encode_u64_to_vec(300), [0xAC, 0x02]);
//! assert_eq!(varint::encode_i64_to_vec(-75), [0x95, 0x01]);
//!
//! let stream = varint::encode_i64_stream(&[0, -1, i64::MIN, i64::MAX]);
//! let values = varint::decode_i64_stream(&stream).unwrap();
//! assert_eq!(values, [0, -1, i64::MIN, i64::MAX]);
//! ```

pub mod io;
pub mod varint;

#[cfg(feature = "cli")]
pub mod cli;
