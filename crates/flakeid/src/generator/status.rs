/// The outcome of one attempt to generate an identifier.
///
/// - [`IdGenStatus::Ready`] carries a freshly issued identifier.
/// - [`IdGenStatus::Pending`] means the generator cannot issue an identifier
///   until the clock advances by `yield_for` milliseconds: either the
///   sequence is exhausted for the current tick, or the clock reads behind
///   the last issued tick. A lock-free generator that loses a
///   compare-and-swap race reports `yield_for: 0` to retry immediately.
///
/// # Example
///
/// ```
/// use flakeid::{BasicGenerator, BitLayout, IdGenStatus, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let layout = BitLayout::DEFAULT;
/// let generator =
///     BasicGenerator::from_components(1, 0, layout.max_sequence(), layout, FixedTime).unwrap();
/// match generator.poll_id() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for: {yield_for} ms"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdGenStatus {
    /// A unique identifier was generated and is ready to use.
    Ready {
        /// The generated identifier.
        id: u64,
    },
    /// No identifier could be generated yet.
    Pending {
        /// Milliseconds to wait before polling again.
        yield_for: u64,
    },
}
