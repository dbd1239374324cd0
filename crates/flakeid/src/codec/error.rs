use core::fmt;

/// Errors that can occur while decoding a compact string.
///
/// No partial value is ever returned alongside an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input is not exactly [`COMPACT_LEN`](crate::COMPACT_LEN)
    /// characters long.
    InvalidLength { len: usize },
    /// A character outside the standard base64 alphabet.
    InvalidByte { offset: usize, byte: u8 },
    /// The final symbol carries bits that do not belong to the payload.
    InvalidLastSymbol { offset: usize, byte: u8 },
    /// Missing or misplaced `=` padding.
    InvalidPadding,
    /// The base64 payload did not decode to exactly 8 bytes.
    InvalidByteCount { count: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { len } => write!(f, "invalid length: {len}"),
            Self::InvalidByte { offset, byte } => {
                write!(f, "invalid byte {byte:#04x} at offset {offset}")
            }
            Self::InvalidLastSymbol { offset, byte } => {
                write!(f, "invalid last symbol {byte:#04x} at offset {offset}")
            }
            Self::InvalidPadding => f.write_str("invalid padding"),
            Self::InvalidByteCount { count } => {
                write!(f, "decoded {count} bytes, expected 8")
            }
        }
    }
}

impl core::error::Error for DecodeError {}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        match err {
            base64::DecodeError::InvalidByte(offset, byte) => Self::InvalidByte { offset, byte },
            base64::DecodeError::InvalidLength(len) => Self::InvalidLength { len },
            base64::DecodeError::InvalidLastSymbol(offset, byte) => {
                Self::InvalidLastSymbol { offset, byte }
            }
            base64::DecodeError::InvalidPadding => Self::InvalidPadding,
        }
    }
}
