use core::time::Duration;
use std::time::Instant;

use super::{DEFAULT_EPOCH, TimeSource, interface::millis_since, interface::saturating_millis};
use crate::error::Result;

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP or daylight savings changes)
/// while still aligning timestamps to a fixed origin.
///
/// Internally, the clock captures `Instant::now()` at construction along with
/// the milliseconds elapsed since the epoch at that moment (computed from
/// `SystemTime::now()`), and adds the monotonic elapsed time on every read.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to the default [`DEFAULT_EPOCH`].
    ///
    /// Panics if system time is earlier than the default epoch.
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH).expect("system clock before DEFAULT_EPOCH")
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::EpochInFuture`] if the current system time
    /// is earlier than `epoch`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::{Duration, SystemTime, UNIX_EPOCH};
    /// use flakeid::{MonotonicClock, TimeSource};
    ///
    /// let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    /// let clock = MonotonicClock::with_epoch(now).unwrap();
    ///
    /// std::thread::sleep(Duration::from_millis(5));
    ///
    /// assert!(clock.current_millis() >= 5);
    /// ```
    ///
    /// [`InvalidArgument::EpochInFuture`]: crate::InvalidArgument::EpochInFuture
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let start = Instant::now();
        let epoch_offset = millis_since(epoch)?;
        Ok(Self {
            start,
            epoch_offset,
        })
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.epoch_offset
            .saturating_add(saturating_millis(self.start.elapsed()))
    }
}
