//! Repository for the `ticket_reminders` table and the scheduler cycle.

use sqlx::PgPool;

use skylane_core::notify;
use skylane_core::reminders::ReminderConfig;
use skylane_core::types::{DbId, Timestamp};

use crate::models::notification::Notification;
use crate::models::reminder::{CycleOutcome, TicketReminder};
use crate::repositories::NotificationRepo;

/// Column list for `ticket_reminders` queries.
const COLUMNS: &str =
    "id, ticket_id, user_email, hours_before, kind, scheduled_at, is_sent, created_at";

/// Provides custom-reminder CRUD and the standard materialize/fire cycle.
pub struct ReminderRepo;

impl ReminderRepo {
    /// Create or replace the custom reminder for a ticket. The partial
    /// unique index allows one custom reminder per ticket; replacing resets
    /// `is_sent` so the new time fires even if the old one already did.
    pub async fn upsert_custom(
        pool: &PgPool,
        ticket_id: DbId,
        user_email: &str,
        hours_before: i32,
        scheduled_at: Timestamp,
    ) -> Result<TicketReminder, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_reminders (ticket_id, user_email, hours_before, kind, scheduled_at) \
             VALUES ($1, $2, $3, 'custom', $4) \
             ON CONFLICT (ticket_id) WHERE kind = 'custom' \
             DO UPDATE SET hours_before = EXCLUDED.hours_before, \
                           scheduled_at = EXCLUDED.scheduled_at, \
                           is_sent = false, \
                           created_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TicketReminder>(&query)
            .bind(ticket_id)
            .bind(user_email)
            .bind(hours_before)
            .bind(scheduled_at)
            .fetch_one(pool)
            .await
    }

    /// Delete a custom reminder from a ticket.
    ///
    /// Returns `true` if a reminder was removed. Standard reminders are not
    /// deletable through this path.
    pub async fn delete_custom(
        pool: &PgPool,
        reminder_id: DbId,
        ticket_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM ticket_reminders WHERE id = $1 AND ticket_id = $2 AND kind = 'custom'",
        )
        .bind(reminder_id)
        .bind(ticket_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reminders attached to any of the given tickets, soonest first.
    pub async fn list_for_tickets(
        pool: &PgPool,
        ticket_ids: &[DbId],
    ) -> Result<Vec<TicketReminder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_reminders \
             WHERE ticket_id = ANY($1) \
             ORDER BY scheduled_at ASC, id ASC"
        );
        sqlx::query_as::<_, TicketReminder>(&query)
            .bind(ticket_ids)
            .fetch_all(pool)
            .await
    }

    /// One scheduler cycle in one transaction: materialize missing standard
    /// reminders for flights inside the lookahead window, then fire due
    /// reminders by writing their notification rows and marking them sent.
    ///
    /// Materialization is a set-based INSERT..SELECT per offset; the partial
    /// unique index plus ON CONFLICT DO NOTHING makes repeated passes
    /// idempotent, and offsets whose fire time already passed are skipped.
    /// Firing joins through tickets to flights, so reminders orphaned by a
    /// deleted flight or ticket are never selected and never consume batch
    /// capacity.
    pub async fn process_cycle(
        pool: &PgPool,
        now: Timestamp,
        config: &ReminderConfig,
    ) -> Result<CycleOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let window_end = now + chrono::Duration::hours(config.lookahead_hours);

        let mut materialized = 0u64;
        for &hours in &config.standard_offsets_hours {
            let result = sqlx::query(
                "INSERT INTO ticket_reminders \
                 (ticket_id, user_email, hours_before, kind, scheduled_at) \
                 SELECT t.id, t.user_email, $3, 'standard', \
                        f.departure - make_interval(hours => $3) \
                 FROM tickets t \
                 JOIN flights f ON f.id = t.flight_id \
                 WHERE t.status = 'paid' \
                   AND f.departure >= $1 AND f.departure <= $2 \
                   AND f.departure - make_interval(hours => $3) > $1 \
                 ORDER BY f.departure ASC \
                 LIMIT $4 \
                 ON CONFLICT (ticket_id, hours_before) WHERE kind = 'standard' \
                 DO NOTHING",
            )
            .bind(now)
            .bind(window_end)
            .bind(hours as i32)
            .bind(config.fire_batch_limit)
            .execute(&mut *tx)
            .await?;
            materialized += result.rows_affected();
        }

        let due: Vec<DueReminder> = sqlx::query_as(
            "SELECT r.id, r.user_email, r.hours_before, \
                    f.flight_number, f.origin, f.destination, f.departure \
             FROM ticket_reminders r \
             JOIN tickets t ON t.id = r.ticket_id \
             JOIN flights f ON f.id = t.flight_id \
             WHERE r.is_sent = false AND t.status = 'paid' AND r.scheduled_at <= $1 \
             ORDER BY r.scheduled_at ASC, r.id ASC \
             LIMIT $2",
        )
        .bind(now)
        .bind(config.fire_batch_limit)
        .fetch_all(&mut *tx)
        .await?;

        let mut fired: Vec<Notification> = Vec::with_capacity(due.len());
        let mut fired_ids: Vec<DbId> = Vec::with_capacity(due.len());
        for reminder in &due {
            let message = notify::reminder_message(
                &reminder.flight_number,
                &reminder.origin,
                &reminder.destination,
                reminder.departure,
                reminder.hours_before,
            );
            let notification = NotificationRepo::create(
                &mut *tx,
                &reminder.user_email,
                notify::KIND_REMINDER,
                &message,
            )
            .await?;
            fired.push(notification);
            fired_ids.push(reminder.id);
        }

        if !fired_ids.is_empty() {
            sqlx::query("UPDATE ticket_reminders SET is_sent = true WHERE id = ANY($1)")
                .bind(&fired_ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(CycleOutcome {
            materialized,
            fired,
        })
    }
}

/// A due reminder joined with the flight it is about.
#[derive(Debug, sqlx::FromRow)]
struct DueReminder {
    id: DbId,
    user_email: String,
    hours_before: i32,
    flight_number: String,
    origin: String,
    destination: String,
    departure: Timestamp,
}
