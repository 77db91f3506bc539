use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::AppState;

/// Runs the price check on a fixed interval inside this process.
/// Does nothing when `ALERT_CHECK_INTERVAL_SECS` is 0.
pub fn spawn_price_alert_monitor(state: AppState) {
    let secs = state.settings.check_interval_secs;
    if secs == 0 {
        tracing::info!("[alert-monitor] disabled, waiting for external triggers");
        return;
    }

    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("[alert-monitor] checking every {secs}s");
        loop {
            interval.tick().await;

            match state.checker.run().await {
                Ok(summary) => tracing::debug!(
                    checked = summary.checked,
                    triggered = summary.triggered(),
                    "[alert-monitor] tick done"
                ),
                Err(e) => tracing::error!("[alert-monitor] tick error: {e}"),
            }
        }
    });
}
