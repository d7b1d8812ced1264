//! Queue pair protocol.
//!
//! Every pinger owns one SPSC reply ring and is named by a [`Token`]. A
//! request is the pinger's own token pushed onto the shared MPSC echo ring;
//! the dispatcher pushes that same token onto the reply ring the token names.
//! With one request in flight per pinger the reply ring always has a free
//! slot, and the echo ring never fills as long as it has at least one slot
//! per pinger. Neither side retries: a full ring is a protocol violation.

use crate::context::RunContext;
use crate::error::{PingerError, PingerResult};
use ringping_ring::{mpsc, spsc, PopError, PushError};
use std::fmt;

/// Identity of a pinger's reply ring, carried as the request payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u32);

impl Token {
    /// Token for pinger `id`
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Pinger id
    pub fn id(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pinger{}", self.0)
    }
}

/// Sending side of the shared echo ring
pub type EchoSender = mpsc::Producer<Token>;

/// Receiving side of the shared echo ring
pub type EchoReceiver = mpsc::Consumer<Token>;

/// Receiving side of a pinger's reply ring
pub type ReplyReceiver = spsc::Consumer<Token>;

/// Where the dispatcher sends replies for one token
pub struct ReplyRoute {
    token: Token,
    sender: spsc::Producer<Token>,
}

impl ReplyRoute {
    /// Route replies for `token` into `sender`
    pub fn new(token: Token, sender: spsc::Producer<Token>) -> Self {
        Self { token, sender }
    }

    /// Token this route serves
    pub fn token(&self) -> Token {
        self.token
    }

    pub(crate) fn into_sender(self) -> spsc::Producer<Token> {
        self.sender
    }
}

/// Create a pinger's reply ring and the route the dispatcher will use for it
pub fn open_reply_queue(
    token: Token,
    capacity: usize,
) -> PingerResult<(ReplyRoute, ReplyReceiver)> {
    let (sender, receiver) = spsc::channel(capacity).map_err(PingerError::ReplyQueue)?;
    Ok((ReplyRoute::new(token, sender), receiver))
}

/// Enqueue a request on the shared echo ring
#[inline]
pub fn send_request(echo: &EchoSender, token: Token) -> PingerResult<()> {
    echo.try_push(token).map_err(|e| match e {
        PushError::Full(_) => PingerError::EchoQueueFull,
        PushError::Disconnected(_) => PingerError::EchoQueueDisconnected,
    })
}

/// Busy-poll the reply ring until a token arrives or the run stops.
///
/// The running flag is checked on every spin, so a stop unblocks the wait
/// within one iteration. Returns `None` when stopped.
#[inline]
pub fn await_reply(replies: &mut ReplyReceiver, ctx: &RunContext) -> PingerResult<Option<Token>> {
    loop {
        match replies.try_pop() {
            Ok(token) => return Ok(Some(token)),
            Err(PopError::Empty) => {}
            Err(PopError::Disconnected) => {
                return if ctx.is_running() {
                    Err(PingerError::ReplyQueueDisconnected)
                } else {
                    Ok(None)
                };
            }
        }
        if !ctx.is_running() {
            return Ok(None);
        }
        std::hint::spin_loop();
    }
}

/// Check that the reply is the token that was sent
#[inline]
pub fn check_reply(sent: Token, received: Token) -> PingerResult<()> {
    if sent != received {
        return Err(PingerError::ReplyMismatch { sent, received });
    }
    Ok(())
}
