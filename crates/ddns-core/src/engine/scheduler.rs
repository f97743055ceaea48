//! Fixed-interval scheduler
//!
//! Runs the [`UpdateEngine`] once, sleeps for the check interval, and
//! repeats. A cycle always runs to completion before the sleep starts, so
//! cycles never overlap. No jitter, no catch-up of missed cycles.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use super::{CycleOutcome, UpdateEngine};

/// Runs the engine on a fixed interval
pub struct Scheduler {
    engine: UpdateEngine,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler running `engine` every `interval`
    pub fn new(engine: UpdateEngine, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Interval between the end of one cycle and the start of the next
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run forever
    pub async fn run(&self) {
        self.run_with_shutdown(std::future::pending::<()>()).await;
    }

    /// Run until `shutdown` resolves
    ///
    /// The shutdown future is only observed between cycles; an in-flight
    /// cycle is never cancelled.
    ///
    /// # Returns
    ///
    /// The number of cycles that ran.
    pub async fn run_with_shutdown<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);
        let mut cycles = 0u64;

        loop {
            let outcome = self.engine.run_cycle().await;
            cycles += 1;
            log_outcome(cycles, &outcome);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received, scheduler stopped after {} cycle(s)", cycles);
                    return cycles;
                }
            }
        }
    }
}

fn log_outcome(cycle: u64, outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::ResolutionFailed { .. } => debug!("Cycle {} skipped", cycle),
        CycleOutcome::UpdateFailed { .. } => debug!("Cycle {} ended without update", cycle),
        CycleOutcome::Unchanged { .. } | CycleOutcome::Updated { .. } => {
            debug!("Cycle {} completed, record in sync", cycle)
        }
    }
}
