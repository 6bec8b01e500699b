//! Accounts, notifications and AI usage records.

use crate::{NotificationId, Role, UsageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Reseller that created this account, if any.
    pub reseller_id: Option<UserId>,
    pub device_limit: u32,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Builds a profile for a new account with the role's default device limit.
    #[must_use]
    pub fn new(email: impl Into<String>, full_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            full_name: full_name.into(),
            role,
            reseller_id: None,
            device_limit: role.default_device_limit(),
            created_at: Utc::now(),
        }
    }
}

/// Display style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(crate::Error::UnknownVariant {
                kind: "notification kind",
                value: other.to_string(),
            }),
        }
    }
}

/// A message addressed to one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    #[must_use]
    pub fn new(
        recipient_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id,
            title: title.into(),
            message: message.into(),
            kind,
            data,
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// One AI-provider call made on behalf of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiUsageRecord {
    pub id: UsageId,
    pub user_id: UserId,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub cost_estimate: f64,
    pub created_at: DateTime<Utc>,
}
