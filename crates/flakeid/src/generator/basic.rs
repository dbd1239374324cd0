use core::cell::Cell;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{IdGenStatus, IdGenerator, state::advance},
    layout::BitLayout,
    time::TimeSource,
};

/// A non-concurrent generator suitable for one worker or thread.
///
/// This generator is lightweight and fast, but **not thread-safe**: its state
/// lives in a [`Cell`], so the type is `!Sync` and cannot be shared between
/// threads without external synchronization. Give each worker its own
/// instance with a distinct generator id instead.
///
/// ## Features
/// - ❌ Not thread-safe
/// - ✅ Any [`BitLayout`]
///
/// ## Recommended When
/// - Each worker owns its own generator
/// - You want the fastest generator
///
/// ## See Also
/// - [`LockGenerator`]
/// - [`AtomicGenerator`]
///
/// [`LockGenerator`]: crate::LockGenerator
/// [`AtomicGenerator`]: crate::AtomicGenerator
pub struct BasicGenerator<T>
where
    T: TimeSource,
{
    state: Cell<u64>,
    generator_id: u64,
    layout: BitLayout,
    time: T,
}

impl<T> BasicGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`BasicGenerator`] with the previous tick and sequence
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
    /// use flakeid::{BasicGenerator, BitLayout, MonotonicClock, yield_backoff};
    ///
    /// let generator = BasicGenerator::new(0, BitLayout::DEFAULT, MonotonicClock::default()).unwrap();
    ///
    /// let id = generator.next_id(yield_backoff);
    /// ```
    ///
    /// [`InvalidArgument::GeneratorIdOutOfRange`]: crate::InvalidArgument::GeneratorIdOutOfRange
    /// [`InvalidArgument::FieldOverflow`]: crate::InvalidArgument::FieldOverflow
    pub fn new(generator_id: u64, layout: BitLayout, time: T) -> Result<Self> {
        Self::from_components(0, generator_id, 0, layout, time)
    }

    /// Creates a new generator from explicit component values.
    ///
    /// This constructor is primarily useful for controlling the starting point
    /// of the generator manually, e.g. in tests.
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
        let id = layout.assemble(timestamp, generator_id, sequence)?;
        layout.check_time(time.current_millis())?;
        Ok(Self {
            state: Cell::new(id),
            generator_id,
            layout,
            time,
        })
    }

    /// Attempts to generate the next available identifier.
    ///
    /// Returns [`IdGenStatus::Pending`] if the sequence is exhausted for the
    /// current millisecond.
    ///
    /// # Example
    /// ```
    /// use flakeid::{BasicGenerator, BitLayout, IdGenStatus, MonotonicClock};
    ///
    /// let generator = BasicGenerator::new(0, BitLayout::DEFAULT, MonotonicClock::default()).unwrap();
    ///
    /// let id = loop {
    ///     match generator.poll_id() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> IdGenStatus {
        let now = self.time.current_millis();
        let status = advance(&self.layout, self.generator_id, self.state.get(), now);
        if let IdGenStatus::Ready { id } = status {
            self.state.set(id);
        }
        status
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

    pub fn time(&self) -> &T {
        &self.time
    }
}

impl<T> IdGenerator for BasicGenerator<T>
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
