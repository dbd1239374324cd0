use core::cmp::Ordering;

use crate::{generator::IdGenStatus, layout::BitLayout};

/// Computes the identifier that follows `current` for a clock reading of
/// `now`.
///
/// The generator state is the last issued identifier itself: its time field
/// is the previous tick and its sequence field the per-tick counter.
///
/// Readings past [`BitLayout::max_time`] are pinned to the last representable
/// tick: the remaining sequence values are handed out and the generator then
/// stays pending, so an exhausted time field never repeats an identifier.
#[inline]
pub(crate) fn advance(layout: &BitLayout, generator_id: u64, current: u64, now: u64) -> IdGenStatus {
    let now = now.min(layout.max_time());
    let tick = layout.time_of(current);
    match now.cmp(&tick) {
        Ordering::Equal => {
            let sequence = layout.sequence_of(current);
            if sequence < layout.max_sequence() {
                IdGenStatus::Ready {
                    id: layout.pack(tick, generator_id, sequence + 1),
                }
            } else {
                IdGenStatus::Pending { yield_for: 1 }
            }
        }
        Ordering::Greater => IdGenStatus::Ready {
            id: layout.pack(now, generator_id, 0),
        },
        Ordering::Less => cold_clock_behind(now, tick),
    }
}

#[cold]
#[inline(never)]
fn cold_clock_behind(now: u64, tick: u64) -> IdGenStatus {
    let yield_for = tick - now;
    #[cfg(feature = "tracing")]
    tracing::warn!(now, tick, yield_for, "clock is behind the last issued tick");
    IdGenStatus::Pending { yield_for }
}
