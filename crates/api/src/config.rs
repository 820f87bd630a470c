use std::str::FromStr;

use skylane_core::reminders::{parse_standard_offsets, ReminderConfig};

use crate::auth::jwt::JwtConfig;

/// Runtime settings for the HTTP server, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins the CORS layer will accept, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Hard cap on request handling time, in seconds.
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight requests during shutdown, in seconds.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Minimum gap between purchases on the same flight by the same user.
    /// Zero disables the throttle.
    pub purchase_throttle_secs: u64,
    pub reminders: ReminderConfig,
}

impl ServerConfig {
    /// Read every setting from the environment.
    ///
    /// Unset variables fall back to development defaults; a variable that is
    /// set but unparsable aborts startup.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                       |
    /// | `PURCHASE_THROTTLE_SECS`     | `2`                        |
    /// | `REMINDER_SCAN_INTERVAL_SECS`| `60`                       |
    /// | `REMINDER_LOOKAHEAD_HOURS`   | `26`                       |
    /// | `REMINDER_STANDARD_OFFSETS`  | `24,2`                     |
    /// | `REMINDER_FIRE_BATCH_LIMIT`  | `200`                      |
    pub fn from_env() -> Self {
        let raw_origins =
            std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into());

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_env("PORT", 3000),
            cors_origins: split_origins(&raw_origins),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            purchase_throttle_secs: parse_env("PURCHASE_THROTTLE_SECS", 2),
            reminders: reminder_config_from_env(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be an integer")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Build a [`ReminderConfig`] from `REMINDER_*` environment variables.
///
/// Unlike the server settings above, anything unset or unparsable here
/// quietly falls back to the default instead of aborting startup.
fn reminder_config_from_env() -> ReminderConfig {
    let defaults = ReminderConfig::default();

    ReminderConfig {
        scan_interval_secs: std::env::var("REMINDER_SCAN_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.scan_interval_secs),
        lookahead_hours: std::env::var("REMINDER_LOOKAHEAD_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.lookahead_hours),
        standard_offsets_hours: std::env::var("REMINDER_STANDARD_OFFSETS")
            .ok()
            .and_then(|v| parse_standard_offsets(&v).ok())
            .unwrap_or(defaults.standard_offsets_hours),
        fire_batch_limit: std::env::var("REMINDER_FIRE_BATCH_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.fire_batch_limit),
    }
}
