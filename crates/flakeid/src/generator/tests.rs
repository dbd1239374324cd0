use core::cell::Cell;
use std::{
    collections::HashSet,
    rc::Rc,
    sync::{Arc, Mutex},
    thread::scope,
};

use crate::{
    AtomicGenerator, BasicGenerator, BitLayout, Error, Field, IdGenStatus, IdGenerator, InvalidArgument,
    LockGenerator, MonotonicClock, TimeSource, yield_backoff,
};

#[derive(Clone, Copy)]
struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Rc::new(MockStepTime {
                values,
                index: Cell::new(0),
            }),
        }
    }

    fn step(&self) {
        self.clock.index.set(self.clock.index.get() + 1);
    }
}

struct FixedTime;
impl TimeSource for FixedTime {
    fn current_millis(&self) -> u64 {
        0
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> u64;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> u64 {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn poll<G: IdGenerator>(generator: &G) -> IdGenStatus {
    generator.try_poll_id().unwrap()
}

fn run_id_sequence_increments_within_same_tick<G: IdGenerator>(generator: &G) {
    let layout = generator.layout();
    let id1 = layout.decompose(poll(generator).unwrap_ready());
    let id2 = layout.decompose(poll(generator).unwrap_ready());
    let id3 = layout.decompose(poll(generator).unwrap_ready());

    assert_eq!(id1.time_offset_ms, 42);
    assert_eq!(id2.time_offset_ms, 42);
    assert_eq!(id3.time_offset_ms, 42);
    assert_eq!(id1.sequence, 0);
    assert_eq!(id2.sequence, 1);
    assert_eq!(id3.sequence, 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_generator_returns_pending_when_sequence_exhausted<G: IdGenerator>(generator: &G) {
    assert_eq!(poll(generator).unwrap_pending(), 1);
    // pending never consumes state
    assert_eq!(poll(generator).unwrap_pending(), 1);
}

fn run_generator_handles_rollover<G: IdGenerator>(generator: &G, shared_time: &SharedMockStepTime) {
    let layout = generator.layout();
    for i in 0..=layout.max_sequence() {
        let parts = layout.decompose(poll(generator).unwrap_ready());
        assert_eq!(parts.sequence, i);
        assert_eq!(parts.time_offset_ms, 42);
        assert_eq!(parts.generator_id, generator.generator_id());
    }

    assert_eq!(poll(generator).unwrap_pending(), 1);

    shared_time.step();

    let parts = layout.decompose(poll(generator).unwrap_ready());
    assert_eq!(parts.time_offset_ms, 43);
    assert_eq!(parts.sequence, 0);
}

fn run_blocking_waits_for_next_tick<G: IdGenerator>(generator: &G, shared_time: &SharedMockStepTime) {
    let mut waits = Vec::new();
    let id = generator
        .try_next_id(|yield_for| {
            waits.push(yield_for);
            shared_time.step();
        })
        .unwrap();

    assert_eq!(waits, [1]);
    let parts = generator.layout().decompose(id);
    assert_eq!(parts.time_offset_ms, 43);
    assert_eq!(parts.sequence, 0);
}

fn run_clock_behind_is_pending<G: IdGenerator>(generator: &G) {
    assert_eq!(poll(generator).unwrap_pending(), 8);
}

fn run_generator_monotonic<G: IdGenerator>(generator: &G) {
    const TOTAL_IDS: usize = 4096 * 64;

    let layout = generator.layout();
    let mut last = None;
    let mut sequence = 0;

    for _ in 0..TOTAL_IDS {
        let id = generator.try_next_id(yield_backoff).unwrap();
        let parts = layout.decompose(id);

        if let Some((last_id, last_ts)) = last {
            assert!(id > last_id);
            if parts.time_offset_ms > last_ts {
                sequence = 0;
            }
        }
        assert_eq!(parts.generator_id, 1);
        assert_eq!(parts.sequence, sequence);

        last = Some((id, parts.time_offset_ms));
        sequence += 1;
    }
}

fn run_generator_monotonic_threaded<G>(make_generator: impl Fn() -> G)
where
    G: IdGenerator + Send + Sync,
{
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator = Arc::new(make_generator());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.try_next_id(yield_backoff).unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn basic_generator_sequence_test() {
    let generator = BasicGenerator::new(0, BitLayout::DEFAULT, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn lock_generator_sequence_test() {
    let generator = LockGenerator::new(0, BitLayout::DEFAULT, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn atomic_generator_sequence_test() {
    let generator = AtomicGenerator::new(0, BitLayout::DEFAULT, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn basic_generator_pending_test() {
    let layout = BitLayout::DEFAULT;
    let generator =
        BasicGenerator::from_components(0, 0, layout.max_sequence(), layout, FixedTime).unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn lock_generator_pending_test() {
    let layout = BitLayout::DEFAULT;
    let generator =
        LockGenerator::from_components(0, 0, layout.max_sequence(), layout, FixedTime).unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn atomic_generator_pending_test() {
    let layout = BitLayout::DEFAULT;
    let generator =
        AtomicGenerator::from_components(0, 0, layout.max_sequence(), layout, FixedTime).unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn basic_generator_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator = BasicGenerator::new(1, BitLayout::DEFAULT, shared_time.clone()).unwrap();
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn lock_generator_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator = LockGenerator::new(1, BitLayout::DEFAULT, shared_time.clone()).unwrap();
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn atomic_generator_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator = AtomicGenerator::new(1, BitLayout::DEFAULT, shared_time.clone()).unwrap();
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn wide_sequence_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator = BasicGenerator::new(511, BitLayout::WIDE_SEQUENCE, shared_time.clone()).unwrap();
    assert_eq!(generator.layout().max_sequence(), 8191);
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn basic_generator_blocks_until_next_tick() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let layout = BitLayout::DEFAULT;
    let generator =
        BasicGenerator::from_components(42, 1, layout.max_sequence(), layout, shared_time.clone())
            .unwrap();
    run_blocking_waits_for_next_tick(&generator, &shared_time);
}

#[test]
fn lock_generator_blocks_until_next_tick() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let layout = BitLayout::DEFAULT;
    let generator =
        LockGenerator::from_components(42, 1, layout.max_sequence(), layout, shared_time.clone())
            .unwrap();
    run_blocking_waits_for_next_tick(&generator, &shared_time);
}

#[test]
fn atomic_generator_blocks_until_next_tick() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let layout = BitLayout::DEFAULT;
    let generator =
        AtomicGenerator::from_components(42, 1, layout.max_sequence(), layout, shared_time.clone())
            .unwrap();
    run_blocking_waits_for_next_tick(&generator, &shared_time);
}

#[test]
fn basic_generator_clock_behind_test() {
    let generator =
        BasicGenerator::from_components(50, 1, 0, BitLayout::DEFAULT, MockTime { millis: 42 })
            .unwrap();
    run_clock_behind_is_pending(&generator);
}

#[test]
fn lock_generator_clock_behind_test() {
    let generator =
        LockGenerator::from_components(50, 1, 0, BitLayout::DEFAULT, MockTime { millis: 42 })
            .unwrap();
    run_clock_behind_is_pending(&generator);
}

#[test]
fn atomic_generator_clock_behind_test() {
    let generator =
        AtomicGenerator::from_components(50, 1, 0, BitLayout::DEFAULT, MockTime { millis: 42 })
            .unwrap();
    run_clock_behind_is_pending(&generator);
}

#[test]
fn first_tick_zero_continues_initial_state() {
    let generator = BasicGenerator::new(2, BitLayout::DEFAULT, FixedTime).unwrap();
    let parts = BitLayout::DEFAULT.decompose(generator.poll_id().unwrap_ready());
    assert_eq!(parts.time_offset_ms, 0);
    assert_eq!(parts.generator_id, 2);
    assert_eq!(parts.sequence, 1);
}

#[test]
fn basic_generator_monotonic_clock_sequence_increments() {
    let generator = BasicGenerator::new(1, BitLayout::DEFAULT, MonotonicClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn lock_generator_monotonic_clock_sequence_increments() {
    let generator = LockGenerator::new(1, BitLayout::DEFAULT, MonotonicClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn atomic_generator_monotonic_clock_sequence_increments() {
    let generator = AtomicGenerator::new(1, BitLayout::DEFAULT, MonotonicClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn lock_generator_threaded_monotonic() {
    let clock = MonotonicClock::default();
    run_generator_monotonic_threaded(move || {
        LockGenerator::new(0, BitLayout::DEFAULT, clock).unwrap()
    });
}

#[test]
fn atomic_generator_threaded_monotonic() {
    let clock = MonotonicClock::default();
    run_generator_monotonic_threaded(move || {
        AtomicGenerator::new(0, BitLayout::WIDE_SEQUENCE, clock).unwrap()
    });
}

#[test]
fn per_worker_generators_never_collide() {
    const WORKERS: u64 = 8;
    const IDS_PER_WORKER: usize = 20_000;

    let clock = MonotonicClock::default();
    let batches: Vec<Vec<u64>> = scope(|s| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|generator_id| {
                s.spawn(move || {
                    let generator = BasicGenerator::new(generator_id, BitLayout::DEFAULT, clock).unwrap();
                    (0..IDS_PER_WORKER)
                        .map(|_| generator.next_id(yield_backoff))
                        .collect::<Vec<u64>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::new();
    for (generator_id, batch) in batches.iter().enumerate() {
        for &id in batch {
            assert_eq!(BitLayout::DEFAULT.decompose(id).generator_id, generator_id as u64);
            assert!(seen.insert(id));
        }
    }
    assert_eq!(seen.len(), WORKERS as usize * IDS_PER_WORKER);
}

#[test]
fn lock_generator_clones_share_state() {
    let generator = LockGenerator::new(4, BitLayout::DEFAULT, MockTime { millis: 42 }).unwrap();
    let clone = generator.clone();

    let a = BitLayout::DEFAULT.decompose(generator.try_poll_id().unwrap().unwrap_ready());
    let b = BitLayout::DEFAULT.decompose(clone.try_poll_id().unwrap().unwrap_ready());
    assert_eq!(a.sequence, 0);
    assert_eq!(b.sequence, 1);
}

#[cfg(not(feature = "parking-lot"))]
#[test]
fn lock_generator_reports_poisoned_lock() {
    let generator = LockGenerator::new(4, BitLayout::DEFAULT, MockTime { millis: 42 }).unwrap();
    let clone = generator.clone();

    let result = std::thread::spawn(move || {
        let _guard = clone.state.lock().unwrap();
        panic!("poison the generator lock");
    })
    .join();
    assert!(result.is_err());

    assert_eq!(generator.try_poll_id(), Err(Error::LockPoisoned));
}

#[test]
fn constructors_reject_out_of_range_generator_id() {
    let expected = Error::InvalidArgument(InvalidArgument::GeneratorIdOutOfRange {
        generator_id: 1024,
        limit: 1024,
    });
    let layout = BitLayout::DEFAULT;
    assert_eq!(BasicGenerator::new(1024, layout, FixedTime).err(), Some(expected.clone()));
    assert_eq!(LockGenerator::new(1024, layout, FixedTime).err(), Some(expected.clone()));
    assert_eq!(AtomicGenerator::new(1024, layout, FixedTime).err(), Some(expected));
}

#[test]
fn constructors_reject_clock_past_time_field() {
    let layout = BitLayout::new(20, 10, 34).unwrap();
    let past = MockTime { millis: 1 << 20 };
    let expected = Error::InvalidArgument(InvalidArgument::FieldOverflow {
        field: Field::Time,
        value: 1 << 20,
        max: (1 << 20) - 1,
    });
    assert_eq!(BasicGenerator::new(1, layout, past).err(), Some(expected.clone()));
    assert_eq!(LockGenerator::new(1, layout, past).err(), Some(expected.clone()));
    assert_eq!(AtomicGenerator::new(1, layout, past).err(), Some(expected));
}

fn run_last_tick_never_repeats<G: IdGenerator>(generator: &G) {
    let mut seen = HashSet::new();
    for _ in 0..64 {
        match poll(generator) {
            IdGenStatus::Ready { id } => assert!(seen.insert(id), "duplicate id {id}"),
            IdGenStatus::Pending { .. } => break,
        }
    }
    assert!(seen.len() > 1);
}

#[test]
fn basic_generator_last_tick_never_repeats() {
    let layout = BitLayout::new(20, 10, 34).unwrap();
    let generator = BasicGenerator::new(1, layout, MockTime { millis: layout.max_time() }).unwrap();
    run_last_tick_never_repeats(&generator);
}

#[test]
fn lock_generator_last_tick_never_repeats() {
    let layout = BitLayout::new(20, 10, 34).unwrap();
    let generator = LockGenerator::new(1, layout, MockTime { millis: layout.max_time() }).unwrap();
    run_last_tick_never_repeats(&generator);
}

#[test]
fn atomic_generator_last_tick_never_repeats() {
    let layout = BitLayout::new(20, 10, 34).unwrap();
    let generator = AtomicGenerator::new(1, layout, MockTime { millis: layout.max_time() }).unwrap();
    run_last_tick_never_repeats(&generator);
}

#[test]
fn from_components_rejects_overflowing_fields() {
    let layout = BitLayout::DEFAULT;
    assert!(matches!(
        BasicGenerator::from_components(0, 1, layout.max_sequence() + 1, layout, FixedTime),
        Err(Error::InvalidArgument(InvalidArgument::FieldOverflow { .. }))
    ));
    assert!(matches!(
        AtomicGenerator::from_components(layout.max_time() + 1, 1, 0, layout, FixedTime),
        Err(Error::InvalidArgument(InvalidArgument::FieldOverflow { .. }))
    ));
}

#[test]
fn trait_exposes_configuration() {
    fn describe(generator: &impl IdGenerator) -> (u64, BitLayout) {
        (generator.generator_id(), generator.layout())
    }

    let generator = AtomicGenerator::new(9, BitLayout::WIDE_SEQUENCE, FixedTime).unwrap();
    assert_eq!(describe(&generator), (9, BitLayout::WIDE_SEQUENCE));
}
