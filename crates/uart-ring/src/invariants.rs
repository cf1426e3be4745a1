//! Debug assertion macros for byte ring invariants.
//!
//! Only active in debug builds (`debug_assert!`), so release builds pay nothing.
//! Counters are free-running `usize` values compared with wrapping arithmetic.

// =============================================================================
// Bounded occupancy
// =============================================================================

/// Assert that occupancy does not exceed capacity.
///
/// **Invariant**: `0 ≤ head.wrapping_sub(tail) ≤ capacity`
///
/// Used in: `put_at()` and `get_at()` after loading both counters.
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "occupancy {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// Single writer per counter
// =============================================================================

/// Assert that nobody else moved a counter while its owner was working on it.
///
/// **Invariant**: `head` has exactly one writer (the producer) and `tail`
/// exactly one writer (the consumer). A mismatch means a second context is
/// advancing the same counter.
///
/// Used in: `put_at()` for head, `get_at()` / `drain_at()` for tail, right
/// before the publishing store.
macro_rules! debug_assert_sole_writer {
    ($name:literal, $counter:expr, $expected:expr) => {
        debug_assert_eq!(
            $counter.load(Ordering::Relaxed),
            $expected,
            "{} was advanced by a second writer",
            $name
        )
    };
}

// =============================================================================
// Slot index range
// =============================================================================

/// Assert that a masked index lands inside storage.
///
/// **Invariant**: `counter & (capacity - 1) < capacity`
macro_rules! debug_assert_index_in_range {
    ($idx:expr, $capacity:expr) => {
        debug_assert!(
            $idx < $capacity,
            "slot index {} outside storage of {} bytes",
            $idx,
            $capacity
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_index_in_range;
pub(crate) use debug_assert_sole_writer;
