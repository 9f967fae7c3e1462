use crate::service::match_service::MatchService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Periodically reconciles the stored status of every unfinished match.
pub struct StatusSweeper {
    match_service: Arc<MatchService>,
    period: Duration,
}

impl StatusSweeper {
    pub fn new(match_service: Arc<MatchService>, period: Duration) -> Self {
        Self {
            match_service,
            period,
        }
    }

    /// Run on the current tokio runtime until the handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(period_secs = self.period.as_secs(), "Starting match status sweeper");
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.match_service.sync_unfinished().await {
                Ok(summary) if summary.updated > 0 || summary.failed > 0 => {
                    info!(
                        checked = summary.checked,
                        updated = summary.updated,
                        failed = summary.failed,
                        "Status sweep reconciled matches"
                    );
                }
                Ok(summary) => debug!(checked = summary.checked, "Status sweep found no drift"),
                Err(e) => warn!(error = %e, "Status sweep failed"),
            }
        }
    }
}
