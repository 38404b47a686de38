// Back-to-back varint streams.
//
// A stream is the plain concatenation of independently encoded groups: no
// count prefix, no separators. Group boundaries come from the continuation
// bit alone, so decoding scans byte by byte until the buffer is exhausted.

use std::fmt;
use std::iter::FusedIterator;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::error::VarIntError;
use super::unsigned::{self, MAX_VARINT_LEN, is_last_byte};
use super::zigzag;

/// Values per rayon task when encoding in parallel.
#[cfg(feature = "parallel")]
const PAR_CHUNK: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

/// One complete group inside a stream buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<'a> {
    /// Byte offset of the group's first byte within the stream.
    pub offset: usize,
    /// The group's bytes, terminator included.
    pub bytes: &'a [u8],
}

/// Splits a stream buffer into consecutive groups.
///
/// Yields an error and then stops when the buffer ends mid-group
/// ([`VarIntError::TruncatedGroup`]) or when 10 bytes pass without a
/// terminator ([`VarIntError::Overflow`]).
#[derive(Debug, Clone)]
pub struct Groups<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Groups<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> Iterator for Groups<'a> {
    type Item = Result<Group<'a>, VarIntError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }

        let offset = self.pos;
        let rest = &self.data[offset..];
        let window = &rest[..rest.len().min(MAX_VARINT_LEN)];

        match window.iter().position(|&b| is_last_byte(b)) {
            Some(i) => {
                self.pos = offset + i + 1;
                Some(Ok(Group {
                    offset,
                    bytes: &rest[..=i],
                }))
            }
            None => {
                self.pos = self.data.len();
                if window.len() == MAX_VARINT_LEN {
                    Some(Err(VarIntError::Overflow { offset }))
                } else {
                    Some(Err(VarIntError::TruncatedGroup { offset }))
                }
            }
        }
    }
}

impl FusedIterator for Groups<'_> {}

/// Count the terminated groups in `data` without decoding them.
pub fn count_groups(data: &[u8]) -> usize {
    data.iter().filter(|&&b| is_last_byte(b)).count()
}

// ---------------------------------------------------------------------------
// Trailing-group policy
// ---------------------------------------------------------------------------

/// What stream decoding does with an incomplete group at the end of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingGroup {
    /// Fail with [`VarIntError::TruncatedGroup`].
    #[default]
    Reject,
    /// Discard the partial group and return the values decoded so far.
    Drop,
}

fn decode_groups<T>(
    data: &[u8],
    policy: TrailingGroup,
    decode: impl Fn(&[u8]) -> Result<T, VarIntError>,
) -> Result<Vec<T>, VarIntError> {
    let mut out = Vec::new();
    for group in Groups::new(data) {
        match group {
            Ok(g) => out.push(decode(g.bytes).map_err(|e| e.at(g.offset))?),
            Err(VarIntError::TruncatedGroup { offset }) if policy == TrailingGroup::Drop => {
                warn!(
                    "dropping truncated trailing group at offset {offset} ({} bytes)",
                    data.len() - offset
                );
                break;
            }
            Err(e) => return Err(e),
        }
    }
    debug!("decoded {} values from {} bytes", out.len(), data.len());
    Ok(out)
}

// ---------------------------------------------------------------------------
// Unsigned streams
// ---------------------------------------------------------------------------

/// Encode every value and concatenate the groups in order.
pub fn encode_u64_stream(values: &[u64]) -> Vec<u8> {
    let len = values.iter().map(|&v| unsigned::encoded_len_u64(v)).sum();
    let mut out = Vec::with_capacity(len);
    for &v in values {
        unsigned::append_u64(&mut out, v);
    }
    out
}

/// Decode a stream of unsigned groups, rejecting a truncated tail.
pub fn decode_u64_stream(data: &[u8]) -> Result<Vec<u64>, VarIntError> {
    decode_u64_stream_with(data, TrailingGroup::Reject)
}

pub fn decode_u64_stream_with(
    data: &[u8],
    policy: TrailingGroup,
) -> Result<Vec<u64>, VarIntError> {
    decode_groups(data, policy, unsigned::decode_u64)
}

// ---------------------------------------------------------------------------
// Signed streams
// ---------------------------------------------------------------------------

/// Zigzag-encode every value and concatenate the groups in order.
pub fn encode_i64_stream(values: &[i64]) -> Vec<u8> {
    let len = values.iter().map(|&v| zigzag::encoded_len_i64(v)).sum();
    let mut out = Vec::with_capacity(len);
    for &v in values {
        zigzag::append_i64(&mut out, v);
    }
    out
}

/// Decode a stream of signed groups, rejecting a truncated tail.
pub fn decode_i64_stream(data: &[u8]) -> Result<Vec<i64>, VarIntError> {
    decode_i64_stream_with(data, TrailingGroup::Reject)
}

pub fn decode_i64_stream_with(
    data: &[u8],
    policy: TrailingGroup,
) -> Result<Vec<i64>, VarIntError> {
    decode_groups(data, policy, zigzag::decode_i64)
}

// ---------------------------------------------------------------------------
// Parallel encoding
// ---------------------------------------------------------------------------

/// Parallel [`encode_u64_stream`]. Output is byte-identical.
#[cfg(feature = "parallel")]
pub fn encode_u64_stream_par(values: &[u64]) -> Vec<u8> {
    let parts: Vec<Vec<u8>> = values.par_chunks(PAR_CHUNK).map(encode_u64_stream).collect();
    parts.concat()
}

/// Parallel [`encode_i64_stream`]. Output is byte-identical.
#[cfg(feature = "parallel")]
pub fn encode_i64_stream_par(values: &[i64]) -> Vec<u8> {
    let parts: Vec<Vec<u8>> = values.par_chunks(PAR_CHUNK).map(encode_i64_stream).collect();
    parts.concat()
}

// ---------------------------------------------------------------------------
// Kind dispatch
// ---------------------------------------------------------------------------

/// Which codec a stream uses. Chosen by the caller, never inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Plain unsigned varints (`uint64`).
    Unsigned,
    /// Zigzag-mapped signed varints (`sint64`).
    Signed,
}

impl ValueKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unsigned => "uint64",
            Self::Signed => "sint64",
        }
    }

    /// Infer the kind from a `.uint64` / `.sint64` file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint64" => Ok(Self::Unsigned),
            "sint64" => Ok(Self::Signed),
            other => Err(format!("unknown value type '{other}' (expected uint64 or sint64)")),
        }
    }
}

/// A decoded sequence of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Values {
    Unsigned(Vec<u64>),
    Signed(Vec<i64>),
}

impl Values {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Unsigned(_) => ValueKind::Unsigned,
            Self::Signed(_) => ValueKind::Signed,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Unsigned(v) => v.len(),
            Self::Signed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode with the codec matching the variant.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Unsigned(v) => encode_u64_stream(v),
            Self::Signed(v) => encode_i64_stream(v),
        }
    }
}

impl fmt::Display for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v:?}"),
            Self::Signed(v) => write!(f, "{v:?}"),
        }
    }
}

/// Decode `data` with the codec selected by `kind`.
pub fn decode_stream(
    kind: ValueKind,
    data: &[u8],
    policy: TrailingGroup,
) -> Result<Values, VarIntError> {
    match kind {
        ValueKind::Unsigned => decode_u64_stream_with(data, policy).map(Values::Unsigned),
        ValueKind::Signed => decode_i64_stream_with(data, policy).map(Values::Signed),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
