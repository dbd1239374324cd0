use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{IdGenStatus, IdGenerator, state::advance},
    layout::BitLayout,
    time::TimeSource,
};

/// A lock-free generator suitable for multi-threaded environments.
///
/// This generator stores the last issued identifier in an [`AtomicU64`] and
/// commits each new identifier with a single compare-and-swap, allowing safe
/// shared use across threads.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Any [`BitLayout`]
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`BasicGenerator`]
/// - [`LockGenerator`]
///
/// [`BasicGenerator`]: crate::BasicGenerator
/// [`LockGenerator`]: crate::LockGenerator
pub struct AtomicGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    generator_id: u64,
    layout: BitLayout,
    time: T,
}

impl<T> AtomicGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`AtomicGenerator`] with the previous tick and sequence
    /// both set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::GeneratorIdOutOfRange`] if `generator_id`
    /// does not fit in `layout`, or [`InvalidArgument::FieldOverflow`] if
    /// `time` already reads past the layout's time field.
    ///
    /// # Example
    /// ```
    /// use flakeid::{AtomicGenerator, BitLayout, IdGenStatus, MonotonicClock};
    ///
    /// let generator = AtomicGenerator::new(0, BitLayout::WIDE_SEQUENCE, MonotonicClock::default()).unwrap();
    ///
    /// let id = loop {
    ///     match generator.poll_id() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => core::hint::spin_loop(),
    ///     }
    /// };
    /// ```
    ///
    /// [`InvalidArgument::GeneratorIdOutOfRange`]: crate::InvalidArgument::GeneratorIdOutOfRange
    /// [`InvalidArgument::FieldOverflow`]: crate::InvalidArgument::FieldOverflow
    pub fn new(generator_id: u64, layout: BitLayout, time: T) -> Result<Self> {
        Self::from_components(0, generator_id, 0, layout, time)
    }

    /// Creates a new generator from explicit component values.
    ///
    /// # ⚠️ Note
    /// In typical use cases, you should prefer [`Self::new`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::InvalidArgument) if any component
    /// does not fit in `layout`, or if `time` already reads past the layout's
    /// time field.
    pub fn from_components(
        timestamp: u64,
        generator_id: u64,
        sequence: u64,
        layout: BitLayout,
        time: T,
    ) -> Result<Self> {
        layout.check_generator_id(generator_id)?;
        let initial = layout.assemble(timestamp, generator_id, sequence)?;
        layout.check_time(time.current_millis())?;
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial),
            generator_id,
            layout,
            time,
        })
    }

    /// Attempts to generate the next available identifier.
    ///
    /// Returns [`IdGenStatus::Pending`] if the sequence is exhausted for the
    /// current millisecond, if the clock is behind the last issued tick, or if
    /// another thread won the compare-and-swap (in which case `yield_for` is
    /// zero and the caller should retry immediately).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> IdGenStatus {
        let now = self.time.current_millis();
        let current = self.state.load(Ordering::Relaxed);

        let next = match advance(&self.layout, self.generator_id, current, now) {
            IdGenStatus::Ready { id } => id,
            pending => return pending,
        };

        if self
            .state
            .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            IdGenStatus::Ready { id: next }
        } else {
            // lost the race, retry immediately
            IdGenStatus::Pending { yield_for: 0 }
        }
    }

    /// Generates the next identifier, calling `f` while the generator is
    /// pending.
    pub fn next_id(&self, mut f: impl FnMut(u64)) -> u64 {
        loop {
            match self.poll_id() {
                IdGenStatus::Ready { id } => break id,
                IdGenStatus::Pending { yield_for } => f(yield_for),
            }
        }
    }
}

impl<T> IdGenerator for AtomicGenerator<T>
where
    T: TimeSource,
{
    type Err = core::convert::Infallible;

    fn layout(&self) -> BitLayout {
        self.layout
    }

    fn generator_id(&self) -> u64 {
        self.generator_id
    }

    fn try_poll_id(&self) -> Result<IdGenStatus, Self::Err> {
        Ok(self.poll_id())
    }
}
