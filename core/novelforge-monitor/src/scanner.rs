//! Threshold threat detection.
//!
//! Three independent scans over a trailing window:
//! - login failures grouped by source address
//! - AI calls grouped by account
//! - device activations grouped by account
//!
//! A group at or above its threshold becomes one [`Threat`]. Scanning never
//! writes; recording is the monitor's job.

use crate::config::ScanConfig;
use crate::error::MonitorResult;
use chrono::{DateTime, Utc};
use novelforge_storage::{BindingLedger, SecurityEventLog, UsageLog};
use novelforge_types::security::{
    API_ABUSE, BRUTE_FORCE_ATTEMPT, LOGIN_FAILURE, SUSPICIOUS_ACTIVITY, UNKNOWN_IP,
};
use novelforge_types::{Severity, UserId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A detected threshold breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    #[serde(rename = "type")]
    pub threat_type: String,
    pub severity: Severity,
    pub description: String,
    pub details: serde_json::Value,
    /// `<type>:<address-or-account>`, used to recognize repeat detections.
    #[serde(skip)]
    pub correlation_key: String,
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub threats: Vec<Threat>,
    pub scan_time: DateTime<Utc>,
}

/// Counts occurrences of each key, in key order.
fn tally<K: Ord>(keys: impl IntoIterator<Item = K>) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

pub struct ThreatScanner<S> {
    store: Arc<S>,
    config: ScanConfig,
}

impl<S> ThreatScanner<S>
where
    S: SecurityEventLog + UsageLog + BindingLedger,
{
    pub fn new(store: Arc<S>, config: ScanConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scan(&self) -> MonitorResult<ScanReport> {
        self.scan_at(Utc::now())
    }

    /// Scans the window ending at `now`.
    pub fn scan_at(&self, now: DateTime<Utc>) -> MonitorResult<ScanReport> {
        let cutoff = now
            .checked_sub_signed(self.config.window())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut threats = self.brute_force(cutoff)?;
        threats.extend(self.api_abuse(cutoff)?);
        threats.extend(self.suspicious_activations(cutoff)?);

        debug!(threats = threats.len(), %cutoff, "threat scan complete");
        Ok(ScanReport {
            threats,
            scan_time: now,
        })
    }

    fn brute_force(&self, cutoff: DateTime<Utc>) -> MonitorResult<Vec<Threat>> {
        let ips = self.store.source_ips_since(LOGIN_FAILURE, cutoff)?;
        let counts = tally(ips.into_iter().flatten().filter(|ip| ip != UNKNOWN_IP));

        Ok(counts
            .into_iter()
            .filter(|(_, count)| *count >= self.config.brute_force_threshold)
            .map(|(ip, count)| Threat {
                threat_type: BRUTE_FORCE_ATTEMPT.to_string(),
                severity: Severity::High,
                description: format!(
                    "IP {ip} failed to log in {count} times within {}",
                    window_label(self.config.window_secs)
                ),
                details: json!({ "ip_address": ip, "failure_count": count }),
                correlation_key: format!("{BRUTE_FORCE_ATTEMPT}:{ip}"),
            })
            .collect())
    }

    fn api_abuse(&self, cutoff: DateTime<Utc>) -> MonitorResult<Vec<Threat>> {
        let users = self.store.usage_users_since(cutoff)?;
        Ok(self.per_user(
            users,
            self.config.api_abuse_threshold,
            API_ABUSE,
            "request_count",
            |user, count, window| {
                format!("user {user} called the AI API {count} times within {window}")
            },
        ))
    }

    fn suspicious_activations(&self, cutoff: DateTime<Utc>) -> MonitorResult<Vec<Threat>> {
        let users = self.store.activation_users_since(cutoff)?;
        Ok(self.per_user(
            users,
            self.config.activation_threshold,
            SUSPICIOUS_ACTIVITY,
            "activation_count",
            |user, count, window| format!("user {user} activated {count} devices within {window}"),
        ))
    }

    fn per_user(
        &self,
        users: Vec<UserId>,
        threshold: usize,
        threat_type: &str,
        count_field: &str,
        describe: impl Fn(&UserId, usize, &str) -> String,
    ) -> Vec<Threat> {
        let window = window_label(self.config.window_secs);
        tally(users)
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(user, count)| Threat {
                threat_type: threat_type.to_string(),
                severity: Severity::Medium,
                description: describe(&user, count, &window),
                details: json!({ "user_id": user, count_field: count }),
                correlation_key: format!("{threat_type}:{user}"),
            })
            .collect()
    }
}

fn window_label(secs: u64) -> String {
    match secs {
        3600 => "the past hour".to_string(),
        s if s % 3600 == 0 => format!("the past {} hours", s / 3600),
        s if s % 60 == 0 => format!("the past {} minutes", s / 60),
        s => format!("the past {s} seconds"),
    }
}
