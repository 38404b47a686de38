// Error type shared by the unsigned, signed and stream codecs.

use std::io;

/// Failure while decoding a varint group or validating codec input.
///
/// Offsets are byte positions within the buffer handed to the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VarIntError {
    /// The buffer is empty or otherwise unusable where data is required.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The buffer ended while the continuation bit was still set.
    #[error("truncated varint group starting at offset {offset}")]
    TruncatedGroup { offset: usize },
    /// The group is longer than 10 bytes or carries bits above bit 63.
    #[error("varint overflow in group starting at offset {offset}")]
    Overflow { offset: usize },
}

impl VarIntError {
    /// Shift the reported offset by `base`, used when a group was decoded
    /// from a sub-slice of a larger stream.
    pub(crate) fn at(self, base: usize) -> Self {
        match self {
            Self::TruncatedGroup { offset } => Self::TruncatedGroup {
                offset: offset + base,
            },
            Self::Overflow { offset } => Self::Overflow {
                offset: offset + base,
            },
            other => other,
        }
    }
}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_rebased() {
        assert_eq!(
            VarIntError::Overflow { offset: 0 }.at(12),
            VarIntError::Overflow { offset: 12 }
        );
        assert_eq!(
            VarIntError::TruncatedGroup { offset: 3 }.at(4),
            VarIntError::TruncatedGroup { offset: 7 }
        );
        assert_eq!(
            VarIntError::InvalidInput("empty").at(9),
            VarIntError::InvalidInput("empty")
        );
    }

    #[test]
    fn converts_to_invalid_data() {
        let e: io::Error = VarIntError::TruncatedGroup { offset: 5 }.into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert!(e.to_string().contains("offset 5"));
    }
}
