use core::{fmt, time::Duration};

use crate::{
    codec::Encoding,
    error::Result,
    generator::{BasicGenerator, yield_backoff},
    layout::BitLayout,
    time::{TimeSource, WallClock},
};

/// A ready-to-use identifier generator for one worker.
///
/// Wraps a [`BasicGenerator`] driven by a [`WallClock`] and hands out either
/// the numeric identifier ([`Generator::generate_long`]) or its big-endian
/// compact string ([`Generator::generate`]). Both calls block (yielding the
/// thread) when the per-millisecond sequence is exhausted, and never fail.
///
/// Like [`BasicGenerator`] it is `!Sync`: give every worker its own instance
/// with a distinct generator id. For one instance shared between threads use
/// [`LockGenerator`] or [`AtomicGenerator`].
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, DEFAULT_EPOCH, Generator};
///
/// let generator = Generator::new(3, DEFAULT_EPOCH).unwrap();
/// assert_eq!(generator.to_string(), "IdGenerator-0003");
///
/// let text = generator.generate();
/// assert_eq!(text.len(), 12);
///
/// let parts = BitLayout::DEFAULT.decompose_compact(&text).unwrap();
/// assert_eq!(parts.generator_id, 3);
/// ```
///
/// [`LockGenerator`]: crate::LockGenerator
/// [`AtomicGenerator`]: crate::AtomicGenerator
pub struct Generator<T = WallClock>
where
    T: TimeSource,
{
    inner: BasicGenerator<T>,
    layout: BitLayout,
    generator_id: u64,
}

impl Generator<WallClock> {
    /// Creates a generator with [`BitLayout::DEFAULT`] and a [`WallClock`]
    /// counting from `epoch` (a [`Duration`] since 1970-01-01 UTC).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::InvalidArgument) if `generator_id`
    /// is outside `[0, 1024)` or `epoch` lies in the future.
    pub fn new(generator_id: u64, epoch: Duration) -> Result<Self> {
        Self::with_layout(generator_id, epoch, BitLayout::DEFAULT)
    }

    /// Creates a generator with a custom [`BitLayout`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::InvalidArgument) if `generator_id`
    /// does not fit `layout`, `epoch` lies in the future, or the time elapsed
    /// since `epoch` no longer fits the layout's time field.
    pub fn with_layout(generator_id: u64, epoch: Duration, layout: BitLayout) -> Result<Self> {
        layout.check_generator_id(generator_id)?;
        Self::with_time(generator_id, layout, WallClock::with_epoch(epoch)?)
    }

    /// The epoch this generator's clock counts from.
    pub fn epoch(&self) -> Duration {
        self.inner.time().epoch()
    }
}

impl<T> Generator<T>
where
    T: TimeSource,
{
    /// Creates a generator over any [`TimeSource`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::GeneratorIdOutOfRange`] if `generator_id`
    /// does not fit `layout`, or [`InvalidArgument::FieldOverflow`] if `time`
    /// already reads past the layout's time field.
    ///
    /// [`InvalidArgument::GeneratorIdOutOfRange`]: crate::InvalidArgument::GeneratorIdOutOfRange
    /// [`InvalidArgument::FieldOverflow`]: crate::InvalidArgument::FieldOverflow
    pub fn with_time(generator_id: u64, layout: BitLayout, time: T) -> Result<Self> {
        Ok(Self {
            inner: BasicGenerator::new(generator_id, layout, time)?,
            layout,
            generator_id,
        })
    }

    /// Returns the next identifier rendered with
    /// [`Encoding::BigEndianCompact`].
    #[must_use]
    pub fn generate(&self) -> String {
        Encoding::BigEndianCompact.encode(self.generate_long())
    }

    /// Returns the next identifier as a number.
    #[must_use]
    pub fn generate_long(&self) -> u64 {
        self.inner.next_id(yield_backoff)
    }

    pub const fn generator_id(&self) -> u64 {
        self.generator_id
    }

    pub const fn layout(&self) -> BitLayout {
        self.layout
    }
}

impl<T> fmt::Display for Generator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdGenerator-{:04}", self.generator_id)
    }
}

impl<T> fmt::Debug for Generator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("generator_id", &self.generator_id)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
