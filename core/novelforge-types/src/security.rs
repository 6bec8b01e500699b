//! Security events.

use crate::{EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event type recorded when a presented bearer token cannot be resolved.
pub const LOGIN_FAILURE: &str = "login_failure";
/// Too many login failures from one source address.
pub const BRUTE_FORCE_ATTEMPT: &str = "brute_force_attempt";
/// Too many AI calls from one account.
pub const API_ABUSE: &str = "api_abuse";
/// Too many device activations from one account.
pub const SUSPICIOUS_ACTIVITY: &str = "suspicious_activity";

/// Placeholder stored when the caller's address cannot be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Severity of a security event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// High and critical events are broadcast to every administrator.
    #[must_use]
    pub fn notifies_admins(&self) -> bool {
        *self >= Self::High
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(crate::Error::UnknownVariant {
                kind: "severity",
                value: other.to_string(),
            }),
        }
    }
}

/// A recorded security event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: EventId,
    pub event_type: String,
    pub severity: Severity,
    /// Account that triggered or reported the event, if known.
    pub actor: Option<UserId>,
    pub source_ip: Option<String>,
    pub description: String,
    pub details: serde_json::Value,
    /// Stable key identifying the subject of a detected threat
    /// (e.g. `brute_force_attempt:203.0.113.5`).
    pub correlation_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_by: Option<UserId>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Input for appending an event to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSecurityEvent {
    pub event_type: String,
    pub severity: Severity,
    pub actor: Option<UserId>,
    pub source_ip: Option<String>,
    pub description: String,
    pub details: serde_json::Value,
    pub correlation_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewSecurityEvent {
    /// Creates an event of the given type and severity timestamped now.
    #[must_use]
    pub fn new(event_type: impl Into<String>, severity: Severity) -> Self {
        Self {
            event_type: event_type.into(),
            severity,
            actor: None,
            source_ip: None,
            description: String::new(),
            details: serde_json::Value::Object(serde_json::Map::new()),
            correlation_key: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Option<UserId>) -> Self {
        self.actor = actor;
        self
    }

    #[must_use]
    pub fn with_source_ip(mut self, ip: Option<String>) -> Self {
        self.source_ip = ip;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    #[must_use]
    pub fn with_correlation_key(mut self, key: Option<String>) -> Self {
        self.correlation_key = key;
        self
    }

    #[must_use]
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Materializes the stored record with a fresh id.
    #[must_use]
    pub fn into_event(self) -> SecurityEvent {
        SecurityEvent {
            id: EventId::new(),
            event_type: self.event_type,
            severity: self.severity,
            actor: self.actor,
            source_ip: self.source_ip,
            description: self.description,
            details: self.details,
            correlation_key: self.correlation_key,
            created_at: self.created_at,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        }
    }
}
