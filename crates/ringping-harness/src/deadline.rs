//! Deadline timer that clears the running flag when the run length elapses

use crate::context::RunContext;
use crate::error::{HarnessError, HarnessResult};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct Shared {
    disarmed: Mutex<bool>,
    cvar: Condvar,
}

/// Armed deadline. Disarming (or dropping) it wakes and joins the timer thread.
pub struct Deadline {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Deadline {
    /// Stop the run after `after` unless disarmed first
    pub fn arm(after: Duration, ctx: Arc<RunContext>) -> HarnessResult<Self> {
        let shared = Arc::new(Shared {
            disarmed: Mutex::new(false),
            cvar: Condvar::new(),
        });
        let timer = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("deadline".to_string())
            .spawn(move || wait_and_stop(&timer, after, &ctx))
            .map_err(|source| HarnessError::Spawn {
                name: "deadline".to_string(),
                source,
            })?;
        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Cancel the deadline and join the timer thread
    pub fn disarm(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        *self.shared.disarmed.lock() = true;
        self.shared.cvar.notify_all();
        if handle.join().is_err() {
            tracing::warn!("deadline thread panicked");
        }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn wait_and_stop(shared: &Shared, after: Duration, ctx: &RunContext) {
    let mut disarmed = shared.disarmed.lock();
    match Instant::now().checked_add(after) {
        Some(deadline) => {
            while !*disarmed {
                if shared.cvar.wait_until(&mut disarmed, deadline).timed_out() {
                    break;
                }
            }
        }
        None => {
            while !*disarmed {
                shared.cvar.wait(&mut disarmed);
            }
        }
    }
    if !*disarmed && ctx.stop() {
        tracing::info!(secs = after.as_secs_f64(), "run length reached");
    }
}
