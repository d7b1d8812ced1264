//! Execution units: one for the dispatcher, the rest for pingers

use core_affinity::CoreId;

/// Execution units available to a run
#[derive(Debug, Clone)]
pub struct ExecutionUnits {
    cores: Vec<Option<CoreId>>,
}

impl ExecutionUnits {
    /// Enumerate the cores this process may run on.
    ///
    /// Falls back to unpinnable units sized by the available parallelism when
    /// the platform does not report core ids.
    pub fn detect() -> Self {
        match core_affinity::get_core_ids() {
            Some(ids) if !ids.is_empty() => Self {
                cores: ids.into_iter().map(Some).collect(),
            },
            _ => {
                let count = std::thread::available_parallelism().map_or(1, |n| n.get());
                tracing::warn!(count, "core ids unavailable, threads will not be pinned");
                Self::unpinned(count)
            }
        }
    }

    /// `count` units with no core to pin to
    pub fn unpinned(count: usize) -> Self {
        Self {
            cores: vec![None; count],
        }
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Whether there are no units at all
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Unit for the dispatcher (the calling thread)
    pub fn dispatcher(&self) -> Option<CoreId> {
        self.cores.first().copied().flatten()
    }

    /// Units left for pingers
    pub fn pingers(&self) -> &[Option<CoreId>] {
        self.cores.get(1..).unwrap_or(&[])
    }
}

/// Pin the current thread to `core` if there is one. Failure is not fatal.
pub(crate) fn pin_current(core: Option<CoreId>, role: &str) {
    let Some(core) = core else {
        return;
    };
    if core_affinity::set_for_current(core) {
        tracing::debug!(role, core = core.id, "thread pinned");
    } else {
        tracing::warn!(role, core = core.id, "failed to pin thread");
    }
}
