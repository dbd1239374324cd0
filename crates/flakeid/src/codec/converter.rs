use super::Encoding;
use crate::error::Result;

/// Converts between numeric identifiers and their **little-endian** compact
/// strings.
///
/// ⚠️ **Not interchangeable with [`Generator::generate`].** The generator
/// renders identifiers with [`Encoding::BigEndianCompact`]; this converter
/// uses [`Encoding::LittleEndianCompact`]. Feeding a generated string to
/// [`IdConverter::to_long`] yields a byte-swapped value, not an error. Use
/// [`Encoding::BigEndianCompact`] directly (or
/// [`BitLayout::decompose_compact`]) for strings that came from a
/// [`Generator`].
///
/// # Example
///
/// ```
/// use flakeid::IdConverter;
///
/// let value = IdConverter::to_long("AAC3UcJAMAA=").unwrap();
/// assert_eq!(value, 13_582_002_220_892_160);
/// assert_eq!(IdConverter::to_text(value), "AAC3UcJAMAA=");
/// ```
///
/// [`Generator`]: crate::Generator
/// [`Generator::generate`]: crate::Generator::generate
/// [`BitLayout::decompose_compact`]: crate::BitLayout::decompose_compact
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IdConverter;

impl IdConverter {
    /// The encoding this converter speaks.
    pub const ENCODING: Encoding = Encoding::LittleEndianCompact;

    /// Parses a little-endian compact string into its numeric value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) if `text` is not a
    /// valid compact string.
    pub fn to_long(text: &str) -> Result<u64> {
        Ok(Self::ENCODING.decode(text)?)
    }

    /// Renders a numeric value as a little-endian compact string.
    #[must_use]
    pub fn to_text(value: u64) -> String {
        Self::ENCODING.encode(value)
    }
}
