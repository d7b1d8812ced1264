//! Pinger worker.
//!
//! INIT creates the private reply ring; RUNNING repeats
//! timestamp → send → busy-wait → timestamp → identity check → record → pace;
//! STOPPED is reached when the running flag clears, even mid-wait.

use crate::context::RunContext;
use crate::error::{PingerError, PingerResult};
use crate::protocol::{self, EchoSender, ReplyReceiver, ReplyRoute, Token};
use std::sync::Arc;
use std::thread;

/// How a worker ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Running flag cleared; clean exit
    Stopped,
    /// Protocol violation or setup failure
    Failed(PingerError),
}

impl WorkerStatus {
    /// Whether this status counts against the run
    pub fn is_failure(&self) -> bool {
        matches!(self, WorkerStatus::Failed(_))
    }
}

/// Per-worker result collected by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingerReport {
    /// Pinger token
    pub token: Token,
    /// Completed, validated round trips
    pub round_trips: u64,
    /// Exit status
    pub status: WorkerStatus,
}

impl PingerReport {
    /// Report for a worker that never got past INIT
    pub fn init_failed(token: Token, error: PingerError) -> Self {
        Self {
            token,
            round_trips: 0,
            status: WorkerStatus::Failed(error),
        }
    }
}

/// A pinger ready to run on its own thread
pub struct Pinger {
    token: Token,
    ctx: Arc<RunContext>,
    echo: EchoSender,
    replies: ReplyReceiver,
    round_trips: u64,
}

impl Pinger {
    /// INIT: create the reply ring.
    ///
    /// The returned route must be handed to the echo dispatcher before the
    /// pinger starts.
    pub fn init(
        token: Token,
        ctx: Arc<RunContext>,
        echo: EchoSender,
    ) -> PingerResult<(Self, ReplyRoute)> {
        let capacity = ctx.config().ring.reply_capacity;
        let (route, replies) = protocol::open_reply_queue(token, capacity)?;
        tracing::debug!(%token, capacity, "reply queue created");
        Ok((
            Self {
                token,
                ctx,
                echo,
                replies,
                round_trips: 0,
            },
            route,
        ))
    }

    /// This pinger's token
    pub fn token(&self) -> Token {
        self.token
    }

    /// Run until stopped or until a protocol violation
    pub fn run(mut self) -> PingerReport {
        let status = match self.ping_loop() {
            Ok(()) => {
                tracing::debug!(
                    token = %self.token,
                    round_trips = self.round_trips,
                    echo_connected = self.echo.is_connected(),
                    "pinger stopped"
                );
                WorkerStatus::Stopped
            }
            Err(e) => {
                tracing::error!(token = %self.token, round_trips = self.round_trips, "pinger failed: {}", e);
                WorkerStatus::Failed(e)
            }
        };
        PingerReport {
            token: self.token,
            round_trips: self.round_trips,
            status,
        }
    }

    fn ping_loop(&mut self) -> PingerResult<()> {
        let ctx = Arc::clone(&self.ctx);
        let clock = ctx.clock();
        let calibration = clock.calibration();
        let delay = ctx.config().delay;

        while ctx.is_running() {
            let t0 = clock.now();
            protocol::send_request(&self.echo, self.token)?;

            let Some(reply) = protocol::await_reply(&mut self.replies, &ctx)? else {
                break;
            };
            let t1 = clock.now();
            protocol::check_reply(self.token, reply)?;

            ctx.histogram()
                .record_cycles(t1.saturating_sub(t0), &calibration);
            self.round_trips += 1;

            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        Ok(())
    }
}
