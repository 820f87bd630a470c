//! Notification vocabulary and message composition.
//!
//! Every notification row carries a kind tag the frontend switches on, and a
//! human-readable message. The tags and the message builders are collected
//! here so the API handlers and the reminder scheduler produce identical
//! text for the same event.

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Notification kinds
// ---------------------------------------------------------------------------

/// A ticket purchase confirmation.
pub const KIND_TICKET: &str = "ticket";

/// A flight the user holds a paid ticket on was edited.
pub const KIND_FLIGHT_UPDATE: &str = "flight_update";

/// A flight the user holds a paid ticket on was cancelled outright.
pub const KIND_FLIGHT_CANCEL: &str = "flight_cancel";

/// A departure reminder fired.
pub const KIND_REMINDER: &str = "reminder";

// ---------------------------------------------------------------------------
// WebSocket message types
// ---------------------------------------------------------------------------

/// Wire type for a persisted notification pushed to its recipient.
pub const WS_TYPE_NOTIFICATION: &str = "notification";

/// Wire type for a broadcast seat-count change.
pub const WS_TYPE_FLIGHT_SEATS: &str = "flight_seats";

// ---------------------------------------------------------------------------
// Message builders
// ---------------------------------------------------------------------------

/// Length cap on the change summary embedded in a flight-update message.
pub const UPDATE_SUMMARY_MAX_CHARS: usize = 900;

/// Purchase confirmation message.
pub fn purchase_message(quantity: i32, flight_number: &str) -> String {
    if quantity == 1 {
        format!("Purchased 1 ticket for flight {flight_number}")
    } else {
        format!("Purchased {quantity} tickets for flight {flight_number}")
    }
}

/// Per-user message for an edited flight. `ticket_count` is how many paid
/// tickets this user holds on the flight; counts above one get a
/// `(tickets: N)` suffix.
pub fn flight_update_message(flight_number: &str, summary: &str, ticket_count: i64) -> String {
    let suffix = ticket_suffix(ticket_count);
    format!("Your flight {flight_number} was updated: {summary}{suffix}")
}

/// Per-user message for a deleted flight with the user's tickets refunded.
pub fn flight_cancel_message(flight_number: &str, ticket_count: i64) -> String {
    let suffix = ticket_suffix(ticket_count);
    format!("Your flight {flight_number} was cancelled. Tickets refunded: {ticket_count}{suffix}.")
}

/// Departure reminder message.
pub fn reminder_message(
    flight_number: &str,
    origin: &str,
    destination: &str,
    departure: Timestamp,
    hours_before: i32,
) -> String {
    format!(
        "Reminder: Flight {flight_number} {origin}->{destination} departs at {} (in ~{hours_before}h).",
        departure.to_rfc3339()
    )
}

/// Join `field: old -> new` fragments into a capped summary string.
///
/// The cap is in characters, not bytes, so the cut never splits a
/// multi-byte value.
pub fn change_summary(parts: &[String]) -> String {
    let joined = parts.join(", ");
    if joined.chars().count() <= UPDATE_SUMMARY_MAX_CHARS {
        joined
    } else {
        joined.chars().take(UPDATE_SUMMARY_MAX_CHARS).collect()
    }
}

fn ticket_suffix(ticket_count: i64) -> String {
    if ticket_count == 1 {
        String::new()
    } else {
        format!(" (tickets: {ticket_count})")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
