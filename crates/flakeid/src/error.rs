use core::fmt;

use crate::codec::DecodeError;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeid` can emit.
///
/// Construction-time problems surface as [`Error::InvalidArgument`] and
/// malformed compact strings as [`Error::Decode`]. Sequence exhaustion is not
/// an error: generators block (or report [`IdGenStatus::Pending`]) until the
/// clock advances.
///
/// [`IdGenStatus::Pending`]: crate::IdGenStatus::Pending
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A constructor or packer argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// A compact string could not be decoded into a 64-bit identifier.
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

/// The specific reason an argument was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidArgument {
    /// The generator id does not fit in the layout's generator field.
    #[error("generator id must be between 0 (inclusive) and {limit} (exclusive), got {generator_id}")]
    GeneratorIdOutOfRange { generator_id: u64, limit: u128 },

    /// The epoch lies after the current wall-clock time.
    #[error("epoch must not be in the future (epoch: {epoch_ms} ms, now: {now_ms} ms)")]
    EpochInFuture { epoch_ms: u128, now_ms: u128 },

    /// The system clock reports a time before 1970-01-01 UTC.
    #[error("system clock is set before the UNIX epoch")]
    ClockBeforeUnixEpoch,

    /// The three field widths do not add up to 64 bits.
    #[error("bit widths must sum to 64, got {time_bits} + {generator_bits} + {sequence_bits} = {total}")]
    LayoutWidth {
        time_bits: u8,
        generator_bits: u8,
        sequence_bits: u8,
        total: u32,
    },

    /// A value is too wide for its field in the layout.
    #[error("{field} value {value} exceeds the maximum of {max}")]
    FieldOverflow { field: Field, value: u64, max: u64 },
}

/// One of the three bit fields of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Time,
    Generator,
    Sequence,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Time => "time",
            Self::Generator => "generator id",
            Self::Sequence => "sequence",
        })
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
