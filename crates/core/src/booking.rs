//! Purchase and cancellation rules for tickets.
//!
//! Quantity limits, the ticket status vocabulary, and the refund cutoff
//! policy live here; the API and database layers consume these so the
//! rules are testable without a running server.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Purchase limits
// ---------------------------------------------------------------------------

/// Smallest number of tickets a single purchase may request.
pub const MIN_PURCHASE_QUANTITY: i32 = 1;

/// Largest number of tickets a single purchase may request.
pub const MAX_PURCHASE_QUANTITY: i32 = 10;

/// Validate that a purchase quantity is within the allowed range.
pub fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if !(MIN_PURCHASE_QUANTITY..=MAX_PURCHASE_QUANTITY).contains(&quantity) {
        return Err(CoreError::Validation(format!(
            "quantity must be between {MIN_PURCHASE_QUANTITY} and {MAX_PURCHASE_QUANTITY}, got {quantity}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ticket status
// ---------------------------------------------------------------------------

/// Lifecycle state of a ticket.
///
/// `Paid` is the only live state; `Refunded` and `Canceled` are terminal.
/// A refunded ticket returned its seat to the flight, a canceled one did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Paid,
    Refunded,
    Canceled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Paid => "paid",
            TicketStatus::Refunded => "refunded",
            TicketStatus::Canceled => "canceled",
        }
    }

    /// Terminal statuses never transition again; repeating a cancel on a
    /// terminal ticket is a no-op that reports the current status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TicketStatus::Paid)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(TicketStatus::Paid),
            "refunded" => Ok(TicketStatus::Refunded),
            "canceled" => Ok(TicketStatus::Canceled),
            other => Err(CoreError::Validation(format!(
                "unknown ticket status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Cancellation policy
// ---------------------------------------------------------------------------

/// Default refund cutoff: cancel at least this many hours before departure
/// and the seat goes back on sale.
pub const DEFAULT_CANCELLATION_CUTOFF_HOURS: i64 = 24;

/// What happens to a paid ticket when the holder cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelDisposition {
    /// Far enough from departure: status becomes `refunded` and the seat is
    /// released back to the flight.
    Refund,
    /// Inside the cutoff window: status becomes `canceled` and the seat
    /// stays sold.
    Forfeit,
}

impl CancelDisposition {
    /// The terminal status this disposition drives the ticket into.
    pub fn resulting_status(&self) -> TicketStatus {
        match self {
            CancelDisposition::Refund => TicketStatus::Refunded,
            CancelDisposition::Forfeit => TicketStatus::Canceled,
        }
    }
}

/// Refund cutoff rule, parameterized so deployments can tune the window.
#[derive(Debug, Clone, Copy)]
pub struct CancellationPolicy {
    pub cutoff_hours: i64,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        CancellationPolicy {
            cutoff_hours: DEFAULT_CANCELLATION_CUTOFF_HOURS,
        }
    }
}

impl CancellationPolicy {
    /// Decide what canceling a paid ticket does, given the flight's
    /// departure time.
    ///
    /// A flight that has already departed (or departs exactly now) cannot be
    /// canceled at all. Exactly at the cutoff counts as refundable.
    pub fn disposition(
        &self,
        departure: Timestamp,
        now: Timestamp,
    ) -> Result<CancelDisposition, CoreError> {
        if departure <= now {
            return Err(CoreError::Conflict(
                "Flight has already departed".to_string(),
            ));
        }
        if departure - now >= Duration::hours(self.cutoff_hours) {
            Ok(CancelDisposition::Refund)
        } else {
            Ok(CancelDisposition::Forfeit)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
