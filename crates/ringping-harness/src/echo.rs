//! Echo dispatcher: drains the shared ring in bursts and bounces every token
//! back to the reply ring it names.

use crate::context::RunContext;
use crate::error::{EchoError, EchoResult};
use crate::protocol::{EchoReceiver, ReplyRoute, Token};
use ringping_ring::{spsc, PushError};

/// Dispatcher counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoStats {
    /// Tokens echoed
    pub echoed: u64,
    /// Non-empty bursts drained
    pub bursts: u64,
    /// Largest burst seen
    pub max_burst: usize,
    /// Reply routes whose pinger was still attached when the loop ended
    pub live_routes: usize,
}

/// Single-threaded echo loop
pub struct EchoDispatcher {
    requests: EchoReceiver,
    /// Reply senders indexed by token id
    routes: Vec<Option<spsc::Producer<Token>>>,
    burst: usize,
    batch: Vec<Token>,
}

impl EchoDispatcher {
    /// Build the dispatcher from the echo ring and every pinger's route
    pub fn new(requests: EchoReceiver, routes: Vec<ReplyRoute>, burst: usize) -> EchoResult<Self> {
        let slots = routes
            .iter()
            .map(|r| r.token().index() + 1)
            .max()
            .unwrap_or(0);
        let mut table: Vec<Option<spsc::Producer<Token>>> = (0..slots).map(|_| None).collect();
        for route in routes {
            let token = route.token();
            let slot = &mut table[token.index()];
            if slot.is_some() {
                return Err(EchoError::DuplicateRoute(token));
            }
            *slot = Some(route.into_sender());
        }

        let burst = burst.max(1);
        Ok(Self {
            requests,
            routes: table,
            burst,
            batch: Vec::with_capacity(burst),
        })
    }

    /// Number of registered reply routes
    pub fn route_count(&self) -> usize {
        self.routes.iter().filter(|r| r.is_some()).count()
    }

    /// Routes whose reply ring still has its pinger on the other end
    fn live_routes(&self) -> usize {
        self.routes
            .iter()
            .flatten()
            .filter(|sender| sender.is_connected())
            .count()
    }

    /// Drain one burst and echo it. Returns how many tokens were echoed.
    pub fn poll_once(&mut self) -> EchoResult<usize> {
        let n = self.requests.pop_burst(&mut self.batch, self.burst);
        for token in self.batch.drain(..) {
            let sender = self
                .routes
                .get_mut(token.index())
                .and_then(Option::as_mut)
                .ok_or(EchoError::UnknownToken(token))?;
            sender.try_push(token).map_err(|e| match e {
                PushError::Full(_) => EchoError::ReplyQueueFull(token),
                PushError::Disconnected(_) => EchoError::ReplyQueueDisconnected(token),
            })?;
        }
        Ok(n)
    }

    /// Echo until the running flag clears.
    ///
    /// Any echo failure clears the flag for everyone and is returned.
    pub fn run(&mut self, ctx: &RunContext) -> EchoResult<EchoStats> {
        let mut stats = EchoStats::default();
        while ctx.is_running() {
            match self.poll_once() {
                Ok(0) => {}
                Ok(n) => {
                    stats.echoed += n as u64;
                    stats.bursts += 1;
                    stats.max_burst = stats.max_burst.max(n);
                }
                Err(e) => {
                    ctx.stop();
                    tracing::error!("echo dispatcher failed: {}", e);
                    return Err(e);
                }
            }
            std::hint::spin_loop();
        }
        stats.live_routes = self.live_routes();
        Ok(stats)
    }
}
