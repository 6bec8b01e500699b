//! Role hierarchy and authenticated principals.
//!
//! Roles are totally ordered: `User < Reseller < Admin`. Every permission
//! check goes through [`Role::at_least`] (or [`Principal::require`]) so there
//! is exactly one place that encodes the hierarchy.

use crate::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Declaration order defines privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer.
    User,
    /// Distributor that issues licenses and manages its own customers.
    Reseller,
    /// Operator with full access.
    Admin,
}

impl Role {
    /// Returns true if this role grants at least the privileges of `min`.
    #[must_use]
    pub fn at_least(self, min: Role) -> bool {
        self >= min
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Reseller => "reseller",
            Self::Admin => "admin",
        }
    }

    /// Default per-profile device allowance for accounts of this role.
    #[must_use]
    pub fn default_device_limit(&self) -> u32 {
        match self {
            Self::User => 1,
            Self::Reseller => 10,
            Self::Admin => 999,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "reseller" => Ok(Self::Reseller),
            "admin" => Ok(Self::Admin),
            other => Err(crate::Error::UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// A caller whose bearer token has been resolved to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Fails with [`AccessDenied`] unless the principal's role is at least `min`.
    pub fn require(&self, min: Role) -> Result<(), AccessDenied> {
        if self.role.at_least(min) {
            Ok(())
        } else {
            Err(AccessDenied {
                required: min,
                actual: self.role,
            })
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Authorization failure: the caller's role is below the required one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("role '{actual}' is not permitted; '{required}' or higher required")]
pub struct AccessDenied {
    pub required: Role,
    pub actual: Role,
}
