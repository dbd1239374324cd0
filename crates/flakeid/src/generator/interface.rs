use core::fmt;

use crate::{generator::IdGenStatus, layout::BitLayout};

/// A minimal interface for generating identifiers.
///
/// Implemented by [`BasicGenerator`] (one per worker), [`LockGenerator`] and
/// [`AtomicGenerator`] (shared across threads).
///
/// [`BasicGenerator`]: crate::BasicGenerator
/// [`LockGenerator`]: crate::LockGenerator
/// [`AtomicGenerator`]: crate::AtomicGenerator
pub trait IdGenerator {
    /// The error type returned by [`IdGenerator::try_poll_id`].
    type Err: fmt::Debug;

    /// The bit layout identifiers are packed with.
    fn layout(&self) -> BitLayout;

    /// The generator id embedded in every identifier.
    fn generator_id(&self) -> u64;

    /// Attempts to generate the next identifier with fallible error handling.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying implementation uses a lock and it
    /// is poisoned.
    fn try_poll_id(&self) -> Result<IdGenStatus, Self::Err>;

    /// Attempts to generate the next identifier.
    ///
    /// This is the infallible counterpart to [`IdGenerator::try_poll_id`].
    fn poll_id(&self) -> IdGenStatus
    where
        Self::Err: Into<core::convert::Infallible>,
    {
        match self.try_poll_id() {
            Ok(status) => status,
            Err(e) => {
                #[allow(unreachable_code)]
                // `into()` satisfies the trait bound at compile time.
                match Into::<core::convert::Infallible>::into(e) {}
            }
        }
    }

    /// Generates the next identifier, calling `f` with the suggested back-off
    /// (in milliseconds) each time the generator is pending.
    ///
    /// This never fails on saturation: it keeps polling until the clock
    /// advances.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying implementation uses a lock and it
    /// is poisoned.
    fn try_next_id(&self, mut f: impl FnMut(u64)) -> Result<u64, Self::Err> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { yield_for } => f(yield_for),
            }
        }
    }

    /// Generates the next identifier, blocking via `f` while pending.
    ///
    /// This is the infallible counterpart to [`IdGenerator::try_next_id`].
    fn next_id(&self, f: impl FnMut(u64)) -> u64
    where
        Self::Err: Into<core::convert::Infallible>,
    {
        match self.try_next_id(f) {
            Ok(id) => id,
            Err(e) => {
                #[allow(unreachable_code)]
                // `into()` satisfies the trait bound at compile time.
                match Into::<core::convert::Infallible>::into(e) {}
            }
        }
    }
}

/// The default back-off used by blocking generation: spin once when asked to
/// retry immediately, otherwise give up the rest of the thread's time slice.
///
/// # Example
///
/// ```
/// use flakeid::{AtomicGenerator, BitLayout, IdGenerator, MonotonicClock, yield_backoff};
///
/// let generator = AtomicGenerator::new(7, BitLayout::DEFAULT, MonotonicClock::default()).unwrap();
/// let id = generator.next_id(yield_backoff);
/// assert_eq!(BitLayout::DEFAULT.decompose(id).generator_id, 7);
/// ```
pub fn yield_backoff(yield_for: u64) {
    if yield_for == 0 {
        core::hint::spin_loop();
    } else {
        std::thread::yield_now();
    }
}
