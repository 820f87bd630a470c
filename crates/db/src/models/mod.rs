//! Row models and repository input/output types.

pub mod company;
pub mod content;
pub mod flight;
pub mod notification;
pub mod reminder;
pub mod stats;
pub mod ticket;
pub mod user;
