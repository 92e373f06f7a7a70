// src/watch/debounce.rs

use notify::Event;
use tracing::debug;

use crate::watch::filter::PathFilter;

/// Coalesces bursts of relevant change events into one rebuild trigger per
/// tick interval.
///
/// Editors and build tools often emit several events for a single logical
/// save (truncate+write, temp-file swap). Any relevant event between two
/// ticks marks the debouncer pending; the next tick fires exactly one
/// trigger and resets it.
#[derive(Debug)]
pub struct EventDebouncer {
    filter: PathFilter,
    pending: bool,
}

impl EventDebouncer {
    pub fn new(filter: PathFilter) -> Self {
        Self {
            filter,
            pending: false,
        }
    }

    /// Feed a raw notification. Marks a rebuild pending if any path in the
    /// event is relevant; idempotent while already pending.
    pub fn on_raw_event(&mut self, event: &Event) {
        if self.pending {
            return;
        }
        for path in &event.paths {
            if self.filter.is_relevant(path, &event.kind) {
                debug!(?path, kind = ?event.kind, "relevant change, rebuild pending");
                self.pending = true;
                return;
            }
        }
    }

    /// Timer tick: returns true exactly once per batch of relevant events,
    /// resetting to idle.
    pub fn on_tick(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}
