//! Error types for the harness

use crate::protocol::Token;
use ringping_metrics::MetricsError;
use ringping_ring::RingError;
use thiserror::Error;

/// Setup errors. Any of these aborts the run before measurement starts.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Not enough execution units for the dispatcher plus the pingers
    #[error("need at least {required} execution units, found {available}")]
    InsufficientUnits {
        /// Units the run needs
        required: usize,
        /// Units detected
        available: usize,
    },

    /// Configuration rejected before the run
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Histogram geometry rejected
    #[error("invalid histogram: {0}")]
    Histogram(#[from] MetricsError),

    /// Shared echo ring could not be created
    #[error("cannot create echo queue: {0}")]
    EchoQueue(#[source] RingError),

    /// Interrupt handler could not be installed
    #[error("cannot install interrupt handler: {0}")]
    StopHandler(#[from] ctrlc::Error),

    /// A harness thread could not be started
    #[error("cannot launch {name}: {source}")]
    Spawn {
        /// Thread name
        name: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for setup operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Protocol violations fatal to a single pinger
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PingerError {
    /// Private reply ring could not be created
    #[error("cannot create reply queue: {0}")]
    ReplyQueue(#[source] RingError),

    /// Shared echo ring had no free slot
    #[error("echo queue full")]
    EchoQueueFull,

    /// Echo dispatcher is gone
    #[error("echo queue disconnected")]
    EchoQueueDisconnected,

    /// Reply ring lost its producer while the run was still going
    #[error("reply queue disconnected while running")]
    ReplyQueueDisconnected,

    /// The reply was not the token that was sent
    #[error("did not get my request back: sent {sent}, received {received}")]
    ReplyMismatch {
        /// Token that was enqueued
        sent: Token,
        /// Token that came back
        received: Token,
    },

    /// Worker thread panicked
    #[error("pinger thread panicked")]
    Panicked,
}

/// Result type for pinger operations
pub type PingerResult<T> = Result<T, PingerError>;

/// Echo dispatcher errors. Any of these ends the whole run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EchoError {
    /// Request token names no registered reply ring
    #[error("no reply route for {0}")]
    UnknownToken(Token),

    /// Two routes registered for one token
    #[error("duplicate reply route for {0}")]
    DuplicateRoute(Token),

    /// Reply ring had no free slot
    #[error("echo enqueue failed: reply queue for {0} is full")]
    ReplyQueueFull(Token),

    /// Pinger dropped its reply ring
    #[error("echo enqueue failed: reply queue for {0} is disconnected")]
    ReplyQueueDisconnected(Token),
}

/// Result type for echo operations
pub type EchoResult<T> = Result<T, EchoError>;
