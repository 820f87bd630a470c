//! Roles and the capability checks derived from them.
//!
//! Roles form a closed set. Authorization decisions go through
//! [`Role::can`]; handlers never compare role strings directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Account role, stored in `users.role` and carried in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular traveller: searches flights, buys and manages own tickets.
    User,
    /// Manages fleet, passengers and stats for assigned companies.
    CompanyManager,
    /// Full control over users, companies and site content.
    Admin,
}

/// Things a caller may be allowed to do, independent of any single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, edit, cancel and delete flights for a company.
    ManageFleet,
    /// Edit promotional banners and offers.
    ManageContent,
    /// Block, unblock and administer user accounts and companies.
    ManageUsers,
    /// Read service-wide statistics.
    ViewServiceStats,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::CompanyManager => "company_manager",
            Role::Admin => "admin",
        }
    }

    /// Whether this role grants `capability`.
    ///
    /// Company managers hold `ManageFleet` in principle; which companies a
    /// manager may touch is checked separately against their assignments.
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageFleet => {
                matches!(self, Role::CompanyManager | Role::Admin)
            }
            Capability::ManageContent
            | Capability::ManageUsers
            | Capability::ViewServiceStats => matches!(self, Role::Admin),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "company_manager" => Ok(Role::CompanyManager),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("unknown role: {other}"))),
        }
    }
}
