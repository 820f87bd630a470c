//! Domain logic shared across the skylane services.
//!
//! This crate is deliberately light on dependencies: everything that can be
//! expressed without a database or an HTTP framework lives here so it can be
//! unit-tested in isolation. That covers the cancellation policy, reminder
//! scheduling rules, role/capability checks, the purchase throttle and
//! confirmation code generation.

pub mod booking;
pub mod codes;
pub mod error;
pub mod notify;
pub mod reminders;
pub mod roles;
pub mod throttle;
pub mod types;
