//! Periodic threat scan.

use crate::state::AppState;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Runs the scheduled scan every `every`, starting one period from now.
pub fn spawn_scheduled_scan(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        info!(interval_secs = every.as_secs(), "scheduled threat scan enabled");

        loop {
            ticker.tick().await;
            let state = state.clone();
            let outcome =
                tokio::task::spawn_blocking(move || state.services().monitor.run_scheduled_scan())
                    .await;
            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => error!(error = %e, "scheduled scan failed"),
                Err(e) => error!(error = %e, "scheduled scan task panicked"),
            }
        }
    })
}
