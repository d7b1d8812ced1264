//! Error types for the rings

use thiserror::Error;

/// Ring construction errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// Capacity is not a power of two, or is too small
    #[error("invalid ring capacity {0}: must be a power of two >= 2")]
    InvalidCapacity(usize),
}

/// Result type for ring construction
pub type RingResult<T> = Result<T, RingError>;

/// Error returned by a non-blocking enqueue. The rejected value is handed back.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PushError<T> {
    /// Every slot is occupied
    #[error("ring is full")]
    Full(T),

    /// The consumer side has been dropped
    #[error("ring consumer has disconnected")]
    Disconnected(T),
}

impl<T> PushError<T> {
    /// Recover the value that could not be enqueued
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(v) | PushError::Disconnected(v) => v,
        }
    }

    /// Whether the ring was full
    pub fn is_full(&self) -> bool {
        matches!(self, PushError::Full(_))
    }
}

/// Error returned by a non-blocking dequeue
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// Nothing to dequeue right now
    #[error("ring is empty")]
    Empty,

    /// Empty, and every producer has been dropped
    #[error("ring producers have disconnected")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RingError::InvalidCapacity(3);
        assert!(err.to_string().contains('3'));

        let err = PushError::Full(7u32);
        assert!(err.is_full());
        assert_eq!(err.to_string(), "ring is full");
        assert_eq!(err.into_inner(), 7);

        let err = PushError::Disconnected(9u32);
        assert!(!err.is_full());
        assert_eq!(err.into_inner(), 9);

        assert!(PopError::Disconnected.to_string().contains("disconnected"));
    }
}
