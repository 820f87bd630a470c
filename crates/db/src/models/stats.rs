//! Aggregate statistics models.

use serde::Serialize;

/// Fleet statistics for a set of companies over an optional time range.
/// `active`/`completed` are always unfiltered by range; `load_factor` is
/// seats sold over capacity, 0.0 when there is no capacity.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyStats {
    pub flights: i64,
    pub active: i64,
    pub completed: i64,
    pub passengers: i64,
    pub revenue: f64,
    pub seats_capacity: i64,
    pub seats_sold: i64,
    pub load_factor: f64,
}

impl CompanyStats {
    /// All-zero stats, used when the caller manages no companies.
    pub fn empty() -> Self {
        Self {
            flights: 0,
            active: 0,
            completed: 0,
            passengers: 0,
            revenue: 0.0,
            seats_capacity: 0,
            seats_sold: 0,
            load_factor: 0.0,
        }
    }
}

/// Service-wide counters for the admin dashboard. `tickets` counts every
/// ticket regardless of status; `total_sales` sums paid tickets only.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub users: i64,
    pub companies: i64,
    pub flights: i64,
    pub tickets: i64,
    pub total_sales: f64,
}
