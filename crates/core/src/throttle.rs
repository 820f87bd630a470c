//! Purchase throttle.
//!
//! Repeated purchase attempts by the same user for the same flight within a
//! short window are rejected before any seats are touched. The store is a
//! trait so deployments can swap the in-process map for a shared backend
//! without touching the purchase path.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::types::DbId;

/// Default minimum gap between two purchase attempts for the same
/// (user, flight) pair.
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_secs(2);

/// Entry cap past which stale entries are swept out of the in-memory store.
const PRUNE_THRESHOLD: usize = 1024;

/// Outcome of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Throttled,
}

/// Records purchase attempts and rejects ones that arrive too soon after
/// the previous attempt for the same user and flight.
///
/// `check_and_record` is atomic from the caller's point of view: an allowed
/// attempt is recorded in the same call, so two racing attempts cannot both
/// pass.
#[async_trait]
pub trait ThrottleStore: Send + Sync {
    async fn check_and_record(&self, email: &str, flight_id: DbId) -> ThrottleDecision;
}

/// In-process throttle store keyed by lowercased email and flight id.
pub struct MemoryThrottle {
    window: Duration,
    entries: Mutex<HashMap<(String, DbId), Instant>>,
}

impl MemoryThrottle {
    pub fn new(window: Duration) -> Self {
        MemoryThrottle {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Decision logic with an injectable clock so tests do not sleep.
    fn decide_at(&self, email: &str, flight_id: DbId, now: Instant) -> ThrottleDecision {
        if self.window.is_zero() {
            return ThrottleDecision::Allowed;
        }
        let key = (email.to_ascii_lowercase(), flight_id);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(last) = entries.get(&key) {
            if now.duration_since(*last) < self.window {
                return ThrottleDecision::Throttled;
            }
        }
        if entries.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            entries.retain(|_, last| now.duration_since(*last) < window);
        }
        entries.insert(key, now);
        ThrottleDecision::Allowed
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[async_trait]
impl ThrottleStore for MemoryThrottle {
    async fn check_and_record(&self, email: &str, flight_id: DbId) -> ThrottleDecision {
        self.decide_at(email, flight_id, Instant::now())
    }
}
