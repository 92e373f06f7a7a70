// src/engine.rs

//! The top-level control loop.
//!
//! One foreground loop multiplexes three event sources: raw filesystem
//! notifications, a fixed-interval timer tick, and the termination signal.
//! Rebuilds run inline within the loop's own turn, so two rebuilds never
//! overlap; events arriving during a build sit in the notify channel and are
//! observed afterwards.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::WatchInitError;
use crate::exec::ProcessSupervisor;
use crate::watch::{EventDebouncer, PathFilter, WatchTree};

/// Debounce granularity: relevant events within one interval collapse into a
/// single rebuild, bounding worst-case rebuild latency to one tick.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Wires the watch tree and debouncer into the process supervisor and runs
/// the event loop until a termination signal arrives.
pub struct Orchestrator {
    tree: WatchTree,
    debouncer: EventDebouncer,
    supervisor: ProcessSupervisor,
    tick: Duration,
}

impl Orchestrator {
    /// Initialize the watch tree and supervisor from a resolved config.
    ///
    /// Fails with [`WatchInitError`] if the notification mechanism cannot be
    /// created or any directory registration fails.
    pub fn new(cfg: &Config) -> Result<Self, WatchInitError> {
        let filter = PathFilter::from_config(cfg);
        let tree = WatchTree::initialize(&cfg.root, &filter)?;

        Ok(Self {
            tree,
            debouncer: EventDebouncer::new(filter),
            supervisor: ProcessSupervisor::new(cfg),
            tick: TICK_INTERVAL,
        })
    }

    /// Override the debounce tick interval. Tests shrink this.
    pub fn with_tick_interval(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Shared handle to the process supervisor, for observing run state.
    pub fn supervisor(&self) -> ProcessSupervisor {
        self.supervisor.clone()
    }

    /// Run until an interrupt/terminate signal arrives. The only normal exit
    /// path; exits with Ok so the process can finish with status 0.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until the given shutdown future resolves.
    ///
    /// Performs one unconditional rebuild-and-run first (there is no prior
    /// change event to react to), then loops over notifications, ticks, and
    /// shutdown. On shutdown the run subprocess is killed and the timer and
    /// notification source are dropped with `self`.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        self.supervisor.rebuild_and_run().await;

        let mut ticker = tokio::time::interval(self.tick);
        // Builds block the loop; ticks missed during one are not replayed.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                maybe_event = self.tree.next_event() => match maybe_event {
                    Some(event) => self.debouncer.on_raw_event(&event),
                    None => {
                        warn!("notification source closed, stopping");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if self.debouncer.on_tick() {
                        self.supervisor.rebuild_and_run().await;
                    }
                }
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping");
                    break;
                }
            }
        }

        self.supervisor.kill();
        Ok(())
    }
}

/// Resolves when SIGINT (ctrl-c) or, on unix, SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                if let Err(err) = ctrl_c.await {
                    error!("failed to listen for ctrl-c: {err}");
                }
                return;
            }
        };

        tokio::select! {
            res = ctrl_c => {
                if let Err(err) = res {
                    error!("failed to listen for ctrl-c: {err}");
                }
            }
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!("failed to listen for ctrl-c: {err}");
        }
    }
}
