//! Departure reminder scheduler.
//!
//! Periodically materializes standard reminders for upcoming flights,
//! fires everything due (standard and custom), and pushes the resulting
//! notifications to connected clients. All database work for one cycle
//! happens in a single transaction inside
//! [`ReminderRepo::process_cycle`]; WebSocket pushes happen only after
//! that transaction commits.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use skylane_core::reminders::ReminderConfig;
use skylane_db::repositories::ReminderRepo;

use crate::notifications::NotificationDispatcher;

/// Delay before the first scan, giving the server time to finish startup.
const STARTUP_DELAY: Duration = Duration::from_secs(3);

/// Run the reminder scheduling loop.
///
/// Each cycle covers flights departing within `config.lookahead_hours` and
/// fires at most `config.fire_batch_limit` reminders. A failed cycle is
/// logged and retried on the next tick. Runs until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    dispatcher: Arc<dyn NotificationDispatcher>,
    config: ReminderConfig,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = config.scan_interval_secs,
        lookahead_hours = config.lookahead_hours,
        offsets = ?config.standard_offsets_hours,
        batch_limit = config.fire_batch_limit,
        "Reminder scheduler started"
    );

    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!("Reminder scheduler stopping");
            return;
        }
        _ = tokio::time::sleep(STARTUP_DELAY) => {}
    }

    let mut interval = tokio::time::interval(Duration::from_secs(config.scan_interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reminder scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                match ReminderRepo::process_cycle(&pool, Utc::now(), &config).await {
                    Ok(outcome) => {
                        if outcome.materialized > 0 || !outcome.fired.is_empty() {
                            tracing::info!(
                                materialized = outcome.materialized,
                                fired = outcome.fired.len(),
                                "Reminder cycle complete"
                            );
                        } else {
                            tracing::debug!("Reminder cycle: nothing due");
                        }
                        for notification in &outcome.fired {
                            dispatcher.deliver(notification).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reminder cycle failed");
                    }
                }
            }
        }
    }
}
