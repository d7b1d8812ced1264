//! # ringping-harness
//!
//! Round-trip latency harness.
//!
//! A set of pinger threads send their reply token through a shared MPSC
//! ring to a single echo dispatcher, which bounces every token back through
//! the pinger's private SPSC ring. Each round trip is timed with the cycle
//! counter and folded into a shared histogram.
//!
//! Features:
//! - Queue pair protocol with identity-checked replies
//! - Busy-polling pinger workers with cancellation on every spin
//! - Burst-draining echo dispatcher on the calling thread
//! - Run controller: unit check, deadline, launch, join, summary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod controller;
pub mod deadline;
pub mod echo;
pub mod error;
pub mod pinger;
pub mod protocol;
pub mod units;

pub use config::{RingConfig, RunConfig};
pub use context::{RunContext, StopHandle};
pub use controller::{RunController, RunOutcome};
pub use deadline::Deadline;
pub use echo::{EchoDispatcher, EchoStats};
pub use error::{
    EchoError, EchoResult, HarnessError, HarnessResult, PingerError, PingerResult,
};
pub use pinger::{Pinger, PingerReport, WorkerStatus};
pub use protocol::{ReplyRoute, Token};
pub use units::ExecutionUnits;
