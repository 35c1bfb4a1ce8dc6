//! Background refresh loop.

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use super::orchestrator::Refresher;

/// Periodically refreshes every stale feed.
pub struct RefreshScheduler {
    refresher: Refresher,
    period: Duration,
}

impl RefreshScheduler {
    /// Create a scheduler that sweeps every `interval_minutes`.
    pub fn new(refresher: Refresher, interval_minutes: u64) -> Self {
        Self::with_period(
            refresher,
            Duration::from_secs(interval_minutes.saturating_mul(60).max(1)),
        )
    }

    /// Create a scheduler with an explicit period.
    pub fn with_period(refresher: Refresher, period: Duration) -> Self {
        Self { refresher, period }
    }

    /// Sweep period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run the sweep loop forever.
    ///
    /// The first sweep happens one period after start; the startup warm-up
    /// covers the time before it.
    pub async fn run(&self) {
        info!(
            "Refresh scheduler started (every {} seconds)",
            self.period.as_secs()
        );

        let mut timer = interval(self.period);
        // A sweep that overruns the period is followed by a full period, not a catch-up burst.
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await;

        loop {
            timer.tick().await;
            debug!("Running scheduled refresh");
            let refreshed = self.refresher.sweep().await;
            debug!("Scheduled refresh updated {} feed(s)", refreshed);
        }
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }
}
