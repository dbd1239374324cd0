use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serde helpers that store a `u64` identifier as its big-endian compact
/// string, the form [`Generator::generate`](crate::Generator::generate)
/// returns.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Serialize, Deserialize)]
/// struct Event {
///     #[serde(with = "flakeid::as_compact")]
///     id: u64,
/// }
/// ```
pub mod as_compact {
    use super::{Deserializer, Serializer};
    use crate::Encoding;

    /// Serialize an identifier as a big-endian compact string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(id: &u64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&Encoding::BigEndianCompact.encode(*id))
    }

    /// Deserialize an identifier from a big-endian compact string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a valid compact string (wrong length, alphabet or
    ///   padding)
    pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CompactVisitor;

        impl serde::de::Visitor<'_> for CompactVisitor {
            type Value = u64;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a 12-character base64 compact identifier")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Encoding::BigEndianCompact
                    .decode(v)
                    .map_err(serde::de::Error::custom)
            }
        }

        d.deserialize_str(CompactVisitor)
    }
}

/// Serde helpers that store a `u64` identifier as a plain integer.
pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an identifier as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(id: &u64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.serialize(s)
    }

    /// Deserialize an identifier from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails.
    pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(d)
    }
}
