use core::time::Duration;
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use portable_atomic::{AtomicU64, Ordering};

use super::{DEFAULT_EPOCH, TimeSource, interface::millis_since, interface::saturating_millis};
use crate::error::Result;

/// A wall-clock time source reading [`SystemTime`] on every call.
///
/// Readings are clamped so that one clock (and its clones) never reports a
/// value below one it already returned: if the system clock steps backwards,
/// the last observed millisecond repeats until real time catches up.
#[derive(Clone, Debug)]
pub struct WallClock {
    epoch: Duration,
    last: Arc<AtomicU64>,
}

impl WallClock {
    /// Creates a clock whose zero point is `epoch`, given as a [`Duration`]
    /// since 1970-01-01 UTC.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::EpochInFuture`] if `epoch` lies after the
    /// current time, or [`InvalidArgument::ClockBeforeUnixEpoch`] if the
    /// system clock is unusable.
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::{TimeSource, WallClock, DEFAULT_EPOCH};
    ///
    /// let clock = WallClock::with_epoch(DEFAULT_EPOCH).unwrap();
    /// assert!(clock.current_millis() > 0);
    /// ```
    ///
    /// [`InvalidArgument::EpochInFuture`]: crate::InvalidArgument::EpochInFuture
    /// [`InvalidArgument::ClockBeforeUnixEpoch`]: crate::InvalidArgument::ClockBeforeUnixEpoch
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let now = millis_since(epoch)?;
        Ok(Self {
            epoch,
            last: Arc::new(AtomicU64::new(now)),
        })
    }

    /// The configured epoch as a [`Duration`] since 1970-01-01 UTC.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    fn read(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(self.epoch))
            .map_or(0, saturating_millis)
    }
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    ///
    /// Panics if the system time is earlier than the default epoch.
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH).expect("system clock before DEFAULT_EPOCH")
    }
}

impl TimeSource for WallClock {
    fn current_millis(&self) -> u64 {
        let now = self.read();
        self.last.fetch_max(now, Ordering::Relaxed).max(now)
    }
}
