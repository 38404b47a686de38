// Buffer and file helpers around the stream codec.
//
// Raw value files hold fixed-width 8-byte big-endian integers back to back.
// `encode_*` turns such a file into a varint stream, `decode_*` turns a varint
// stream back into big-endian integers, and `roundtrip_*` encodes, decodes and
// verifies the result matches the input.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, trace};

use crate::varint::{TrailingGroup, ValueKind, Values, VarIntError, decode_stream};

/// Width of one raw big-endian value.
pub const VALUE_WIDTH: usize = 8;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for buffer and file operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Malformed raw values or varint stream.
    #[error("codec error: {0}")]
    VarInt(#[from] VarIntError),
    /// Decoding the freshly encoded stream did not reproduce the input.
    #[error("roundtrip mismatch at value {index}")]
    Mismatch { index: usize },
}

// ---------------------------------------------------------------------------
// Big-endian value source
// ---------------------------------------------------------------------------

fn check_value_buffer(data: &[u8]) -> Result<(), VarIntError> {
    if data.is_empty() {
        return Err(VarIntError::InvalidInput("empty value buffer"));
    }
    if data.len() % VALUE_WIDTH != 0 {
        return Err(VarIntError::InvalidInput(
            "value buffer length is not a multiple of 8",
        ));
    }
    Ok(())
}

fn be_word(chunk: &[u8]) -> [u8; VALUE_WIDTH] {
    let mut word = [0u8; VALUE_WIDTH];
    word.copy_from_slice(chunk);
    word
}

/// Split `data` into consecutive 8-byte big-endian unsigned integers.
pub fn parse_be_u64s(data: &[u8]) -> Result<Vec<u64>, VarIntError> {
    check_value_buffer(data)?;
    Ok(data
        .chunks_exact(VALUE_WIDTH)
        .map(|chunk| u64::from_be_bytes(be_word(chunk)))
        .collect())
}

/// Split `data` into consecutive 8-byte big-endian two's-complement integers.
pub fn parse_be_i64s(data: &[u8]) -> Result<Vec<i64>, VarIntError> {
    check_value_buffer(data)?;
    Ok(data
        .chunks_exact(VALUE_WIDTH)
        .map(|chunk| i64::from_be_bytes(be_word(chunk)))
        .collect())
}

/// Parse raw values as the given kind.
pub fn parse_be_values(kind: ValueKind, data: &[u8]) -> Result<Values, VarIntError> {
    match kind {
        ValueKind::Unsigned => parse_be_u64s(data).map(Values::Unsigned),
        ValueKind::Signed => parse_be_i64s(data).map(Values::Signed),
    }
}

pub fn to_be_bytes_u64s(values: &[u64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

pub fn to_be_bytes_i64s(values: &[i64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Render values back into the raw big-endian layout.
pub fn to_be_bytes(values: &Values) -> Vec<u8> {
    match values {
        Values::Unsigned(v) => to_be_bytes_u64s(v),
        Values::Signed(v) => to_be_bytes_i64s(v),
    }
}

// ---------------------------------------------------------------------------
// In-memory transcoding
// ---------------------------------------------------------------------------

/// Raw values together with their varint stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub values: Values,
    pub stream: Vec<u8>,
}

/// Parse raw big-endian values and encode them as a varint stream.
pub fn encode_buffer(kind: ValueKind, raw: &[u8]) -> Result<Encoded, VarIntError> {
    let values = parse_be_values(kind, raw)?;
    let stream = values.encode();
    debug!(
        "encoded {} {kind} values: {} raw bytes -> {} stream bytes",
        values.len(),
        raw.len(),
        stream.len()
    );
    Ok(Encoded { values, stream })
}

/// Decode a varint stream into values.
pub fn decode_buffer(
    kind: ValueKind,
    stream: &[u8],
    policy: TrailingGroup,
) -> Result<Values, VarIntError> {
    if stream.is_empty() {
        return Err(VarIntError::InvalidInput("empty varint stream"));
    }
    decode_stream(kind, stream, policy)
}

/// Outcome of a successful encode/decode cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roundtrip {
    pub encoded: Encoded,
    pub decoded: Values,
}

/// Encode raw values, decode the stream again and check both sides agree.
pub fn roundtrip_buffer(kind: ValueKind, raw: &[u8]) -> Result<Roundtrip, IoError> {
    let encoded = encode_buffer(kind, raw)?;
    let decoded = decode_stream(kind, &encoded.stream, TrailingGroup::Reject)?;
    if let Some(index) = first_mismatch(&encoded.values, &decoded) {
        return Err(IoError::Mismatch { index });
    }
    trace!("roundtrip ok: {} values", decoded.len());
    Ok(Roundtrip { encoded, decoded })
}

/// Index of the first differing value, or `None` when equal.
/// A length difference reports the shorter length.
pub fn first_mismatch(a: &Values, b: &Values) -> Option<usize> {
    fn diff<T: PartialEq>(a: &[T], b: &[T]) -> Option<usize> {
        a.iter()
            .zip(b)
            .position(|(x, y)| x != y)
            .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
    }
    match (a, b) {
        (Values::Unsigned(a), Values::Unsigned(b)) => diff(a, b),
        (Values::Signed(a), Values::Signed(b)) => diff(a, b),
        _ => Some(0),
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by the file helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    /// Number of values processed.
    pub values: usize,
    /// Input file size in bytes.
    pub input_size: u64,
    /// Bytes written (or, for a roundtrip, the size of the varint stream).
    pub output_size: u64,
}

fn write_output(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    writer.write_all(data)?;
    writer.flush()
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Encode a raw big-endian value file into a varint stream file.
pub fn encode_file(
    kind: ValueKind,
    input_path: &Path,
    output_path: &Path,
) -> Result<FileStats, IoError> {
    let raw = std::fs::read(input_path)?;
    let encoded = encode_buffer(kind, &raw)?;
    write_output(output_path, &encoded.stream)?;

    Ok(FileStats {
        values: encoded.values.len(),
        input_size: raw.len() as u64,
        output_size: encoded.stream.len() as u64,
    })
}

/// Decode a varint stream file into a raw big-endian value file.
pub fn decode_file(
    kind: ValueKind,
    input_path: &Path,
    output_path: &Path,
    policy: TrailingGroup,
) -> Result<FileStats, IoError> {
    let stream = std::fs::read(input_path)?;
    let values = decode_buffer(kind, &stream, policy)?;
    let raw = to_be_bytes(&values);
    write_output(output_path, &raw)?;

    Ok(FileStats {
        values: values.len(),
        input_size: stream.len() as u64,
        output_size: raw.len() as u64,
    })
}

/// Roundtrip a raw big-endian value file through the codec without writing.
pub fn roundtrip_file(kind: ValueKind, input_path: &Path) -> Result<FileStats, IoError> {
    let raw = std::fs::read(input_path)?;
    let rt = roundtrip_buffer(kind, &raw)?;

    Ok(FileStats {
        values: rt.decoded.len(),
        input_size: raw.len() as u64,
        output_size: rt.encoded.stream.len() as u64,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
