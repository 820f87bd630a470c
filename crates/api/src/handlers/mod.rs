//! Request handlers for the REST API.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the repositories in `skylane_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod admin;
pub mod auth;
pub mod company;
pub mod content;
pub mod flights;
pub mod notifications;
pub mod tickets;

use chrono::{NaiveTime, Utc};
use skylane_core::types::Timestamp;

/// Resolve a `?range=` query value into an optional `[start, end]` window.
///
/// - `today`: UTC midnight to midnight + 1 day
/// - `week`: the trailing 7 days
/// - `month`: the trailing 30 days
/// - anything else (including `all` and absent): unbounded
pub(crate) fn stats_time_range(range: Option<&str>) -> (Option<Timestamp>, Option<Timestamp>) {
    let now = Utc::now();
    match range {
        Some("today") => {
            let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
            (Some(start), Some(start + chrono::Duration::days(1)))
        }
        Some("week") => (Some(now - chrono::Duration::days(7)), Some(now)),
        Some("month") => (Some(now - chrono::Duration::days(30)), Some(now)),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_time_range_today_is_one_day() {
        let (start, end) = stats_time_range(Some("today"));
        let (start, end) = (start.unwrap(), end.unwrap());
        assert_eq!(end - start, chrono::Duration::days(1));
        assert_eq!(start.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_stats_time_range_all_is_unbounded() {
        assert_eq!(stats_time_range(None), (None, None));
        assert_eq!(stats_time_range(Some("all")), (None, None));
        assert_eq!(stats_time_range(Some("bogus")), (None, None));
    }
}
