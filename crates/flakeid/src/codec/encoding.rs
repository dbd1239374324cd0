use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::DecodeError;

/// Length of a compact string: 8 bytes in standard base64 is 11 symbols plus
/// one `=` of padding.
pub const COMPACT_LEN: usize = 12;

/// The byte order used when rendering a 64-bit identifier as a compact
/// base64 string.
///
/// The two variants produce **different strings for the same value** and
/// cannot be decoded with each other. Pick one per deployment.
///
/// - [`Encoding::BigEndianCompact`] is what [`Generator::generate`] emits.
///   The time field lands in the leading bytes.
/// - [`Encoding::LittleEndianCompact`] is what [`IdConverter`] speaks.
///
/// # Example
///
/// ```
/// use flakeid::Encoding;
///
/// let text = Encoding::BigEndianCompact.encode(201_561_779_220_480);
/// assert_eq!(text, "AAC3UcJAMAA=");
/// assert_eq!(Encoding::BigEndianCompact.decode(&text).unwrap(), 201_561_779_220_480);
/// assert_ne!(Encoding::LittleEndianCompact.encode(201_561_779_220_480), text);
/// ```
///
/// [`Generator::generate`]: crate::Generator::generate
/// [`IdConverter`]: crate::IdConverter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Most significant byte first, then standard base64 with padding.
    #[default]
    BigEndianCompact,
    /// Least significant byte first, then standard base64 with padding.
    LittleEndianCompact,
}

impl Encoding {
    /// Renders `value` as a [`COMPACT_LEN`]-character string.
    #[must_use]
    pub fn encode(self, value: u64) -> String {
        STANDARD.encode(self.bytes_of(value))
    }

    /// Parses a compact string back into the 64-bit value.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the input is not exactly
    /// [`COMPACT_LEN`] characters, contains symbols outside the standard
    /// base64 alphabet, is padded incorrectly, or does not carry exactly 8
    /// bytes.
    pub fn decode(self, text: &str) -> Result<u64, DecodeError> {
        if text.len() != COMPACT_LEN {
            return Err(DecodeError::InvalidLength { len: text.len() });
        }
        let decoded = STANDARD.decode(text)?;
        let bytes = <[u8; 8]>::try_from(decoded.as_slice()).map_err(|_| {
            DecodeError::InvalidByteCount {
                count: decoded.len(),
            }
        })?;
        Ok(self.value_of(bytes))
    }

    const fn bytes_of(self, value: u64) -> [u8; 8] {
        match self {
            Self::BigEndianCompact => value.to_be_bytes(),
            Self::LittleEndianCompact => value.to_le_bytes(),
        }
    }

    const fn value_of(self, bytes: [u8; 8]) -> u64 {
        match self {
            Self::BigEndianCompact => u64::from_be_bytes(bytes),
            Self::LittleEndianCompact => u64::from_le_bytes(bytes),
        }
    }
}
