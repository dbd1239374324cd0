use core::time::Duration;
use std::{
    rc::Rc,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::error::{InvalidArgument, Result};

/// Default epoch: Tuesday, January 1, 2013 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_356_998_400_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of milliseconds elapsed since a configured epoch.
///
/// Implementations must never go backwards. Generators treat a reading below
/// the last issued tick as a stall and wait for the clock to catch up.
///
/// # Example
///
/// ```
/// use flakeid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Rc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// Milliseconds from `epoch` to now on the system clock.
///
/// # Errors
///
/// - [`InvalidArgument::ClockBeforeUnixEpoch`] if the system clock reads
///   before 1970.
/// - [`InvalidArgument::EpochInFuture`] if `epoch` lies after now.
pub(crate) fn millis_since(epoch: Duration) -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| InvalidArgument::ClockBeforeUnixEpoch)?;
    let elapsed = now
        .checked_sub(epoch)
        .ok_or(InvalidArgument::EpochInFuture {
            epoch_ms: epoch.as_millis(),
            now_ms: now.as_millis(),
        })?;
    Ok(saturating_millis(elapsed))
}

pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
