use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{IdGenStatus, IdGenerator, Mutex, state::advance},
    layout::BitLayout,
    time::TimeSource,
};

/// The error produced by [`LockGenerator`]: lock poisoning with a std mutex,
/// nothing at all with `parking_lot`.
#[cfg(not(feature = "parking-lot"))]
pub type LockError = crate::Error;
/// The error produced by [`LockGenerator`]: lock poisoning with a std mutex,
/// nothing at all with `parking_lot`.
#[cfg(feature = "parking-lot")]
pub type LockError = core::convert::Infallible;

/// A lock-based generator suitable for multi-threaded environments.
///
/// This generator wraps its state in an [`Arc<Mutex<_>>`], allowing one
/// generator identity to serve many threads. Clones share the same state.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Any [`BitLayout`]
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
/// - Your target doesn't support 64-bit atomics
///
/// ## See Also
/// - [`BasicGenerator`]
/// - [`AtomicGenerator`]
///
/// [`BasicGenerator`]: crate::BasicGenerator
/// [`AtomicGenerator`]: crate::AtomicGenerator
pub struct LockGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    pub(crate) state: Arc<crossbeam_utils::CachePadded<Mutex<u64>>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Arc<Mutex<u64>>,
    generator_id: u64,
    layout: BitLayout,
    pub(crate) time: T,
}

impl<T> Clone for LockGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            generator_id: self.generator_id,
            layout: self.layout,
            time: self.time.clone(),
        }
    }
}

impl<T> LockGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockGenerator`] with the previous tick and sequence both
    /// set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::GeneratorIdOutOfRange`] if `generator_id`
    /// does not fit in `layout`, or [`InvalidArgument::FieldOverflow`] if
    /// `time` already reads past the layout's time field.
    ///
    /// # Example
    /// ```
    /// use flakeid::{BitLayout, IdGenerator, LockGenerator, MonotonicClock, yield_backoff};
    ///
    /// let generator = LockGenerator::new(0, BitLayout::DEFAULT, MonotonicClock::default()).unwrap();
    ///
    /// std::thread::scope(|s| {
    ///     for _ in 0..4 {
    ///         s.spawn(|| generator.try_next_id(yield_backoff).unwrap());
    ///     }
    /// });
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
        let id = layout.assemble(timestamp, generator_id, sequence)?;
        layout.check_time(time.current_millis())?;
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(id))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(id)),
            generator_id,
            layout,
            time,
        })
    }

    /// Attempts to generate the next identifier with fallible error handling.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new identifier is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: The time to wait (in
    ///   milliseconds) before trying again
    /// - `Err(e)`: the lock was poisoned
    ///
    /// # Errors
    /// - Returns an error if the underlying lock has been poisoned.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus, LockError> {
        let now = self.time.current_millis();

        let mut id = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        let status = advance(&self.layout, self.generator_id, *id, now);
        if let IdGenStatus::Ready { id: next } = status {
            *id = next;
        }
        Ok(status)
    }
}

impl<T> IdGenerator for LockGenerator<T>
where
    T: TimeSource,
{
    type Err = LockError;

    fn layout(&self) -> BitLayout {
        self.layout
    }

    fn generator_id(&self) -> u64 {
        self.generator_id
    }

    fn try_poll_id(&self) -> Result<IdGenStatus, Self::Err> {
        self.try_poll_id()
    }
}
