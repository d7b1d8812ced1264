//! # ringping-ring
//!
//! Bounded, non-blocking rings used by the ringping harness.
//!
//! Two disciplines are provided:
//! - [`mpsc`]: many producers, one consumer, with burst dequeue
//! - [`spsc`]: one producer, one consumer
//!
//! The single sides are unique handles taking `&mut self`, so the
//! producer/consumer discipline is enforced by the type system rather than
//! by callers.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod mpsc;
pub mod spsc;

pub use error::{PopError, PushError, RingError, RingResult};

/// Smallest capacity accepted by any ring.
pub const MIN_CAPACITY: usize = 2;

/// Validate a requested ring capacity.
///
/// Capacities must be powers of two so slot lookup is a mask.
pub(crate) fn check_capacity(capacity: usize) -> RingResult<usize> {
    if capacity < MIN_CAPACITY || !capacity.is_power_of_two() {
        return Err(RingError::InvalidCapacity(capacity));
    }
    Ok(capacity - 1)
}
