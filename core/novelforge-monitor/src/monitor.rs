//! Security event reporting, resolution and the scheduled scan.

use crate::config::ScanConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::scanner::{ScanReport, Threat, ThreatScanner};
use chrono::{DateTime, Utc};
use novelforge_storage::{
    BindingLedger, NotificationOutbox, ProfileDirectory, ResolveOutcome, SecurityEventLog,
    UsageLog,
};
use novelforge_types::security::UNKNOWN_IP;
use novelforge_types::{
    EventId, NewSecurityEvent, Notification, NotificationKind, Principal, Role, SecurityEvent,
    Severity,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// A client- or system-reported security event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReport {
    pub event_type: String,
    pub severity: Severity,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub source_ip: Option<String>,
}

impl EventReport {
    pub fn new(event_type: impl Into<String>, severity: Severity) -> Self {
        Self {
            event_type: event_type.into(),
            severity,
            description: None,
            details: None,
            source_ip: None,
        }
    }
}

/// Counts from one scheduled scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub detected: usize,
    pub recorded: usize,
    pub suppressed: usize,
    pub scan_time: DateTime<Utc>,
}

pub struct SecurityMonitor<S> {
    store: Arc<S>,
    scanner: ThreatScanner<S>,
}

impl<S> SecurityMonitor<S>
where
    S: SecurityEventLog + UsageLog + BindingLedger + ProfileDirectory + NotificationOutbox,
{
    pub fn new(store: Arc<S>, config: ScanConfig) -> Self {
        Self {
            scanner: ThreatScanner::new(Arc::clone(&store), config),
            store,
        }
    }

    #[must_use]
    pub fn scanner(&self) -> &ThreatScanner<S> {
        &self.scanner
    }

    /// Detects threats without recording them.
    pub fn scan_threats(&self) -> MonitorResult<ScanReport> {
        self.scanner.scan()
    }

    /// Admin-only on-demand scan.
    pub fn scan_threats_as(&self, principal: &Principal) -> MonitorResult<ScanReport> {
        principal.require(Role::Admin)?;
        self.scanner.scan()
    }

    /// Appends a reported event. High and critical events notify every admin.
    pub fn report_security_event(
        &self,
        report: EventReport,
        reporter: Option<&Principal>,
    ) -> MonitorResult<SecurityEvent> {
        let event_type = report.event_type.trim();
        if event_type.is_empty() {
            return Err(MonitorError::InvalidRequest(
                "eventType must not be empty".to_string(),
            ));
        }

        let source_ip = report
            .source_ip
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        let mut new_event = NewSecurityEvent::new(event_type, report.severity)
            .with_actor(reporter.map(|p| p.user_id))
            .with_source_ip(Some(source_ip))
            .with_description(report.description.unwrap_or_default());
        if let Some(details) = report.details {
            new_event = new_event.with_details(details);
        }

        self.record(new_event)
    }

    fn record(&self, new_event: NewSecurityEvent) -> MonitorResult<SecurityEvent> {
        let event = self.store.append_event(new_event)?;
        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            severity = %event.severity,
            "security event recorded"
        );
        if event.severity.notifies_admins() {
            self.notify_admins(&event)?;
        }
        Ok(event)
    }

    fn notify_admins(&self, event: &SecurityEvent) -> MonitorResult<()> {
        let kind = if event.severity == Severity::Critical {
            NotificationKind::Error
        } else {
            NotificationKind::Warning
        };
        let message = if event.description.is_empty() {
            format!("detected a {} security event", event.severity)
        } else {
            event.description.clone()
        };

        let admins = self.store.profiles_with_role(Role::Admin)?;
        for admin in &admins {
            let notification = Notification::new(
                admin.id,
                format!("Security alert: {}", event.event_type),
                message.clone(),
                kind,
                json!({
                    "securityEventId": event.id,
                    "eventType": event.event_type,
                    "severity": event.severity,
                    "ipAddress": event.source_ip,
                }),
            );
            self.store.push_notification(&notification)?;
        }
        info!(event_id = %event.id, admins = admins.len(), "admins notified");
        Ok(())
    }

    /// Marks an event resolved by an admin. A second resolution is rejected.
    pub fn resolve_event(
        &self,
        event_id: EventId,
        principal: &Principal,
    ) -> MonitorResult<SecurityEvent> {
        principal.require(Role::Admin)?;
        match self.store.resolve_event(event_id, principal.user_id, Utc::now())? {
            ResolveOutcome::Resolved(event) => {
                info!(%event_id, resolved_by = %principal.user_id, "security event resolved");
                Ok(event)
            }
            ResolveOutcome::AlreadyResolved => Err(MonitorError::EventAlreadyResolved),
            ResolveOutcome::NotFound => Err(MonitorError::EventNotFound),
        }
    }

    /// Scans and records every threat as a security event.
    pub fn run_scheduled_scan(&self) -> MonitorResult<ScanSummary> {
        self.run_scheduled_scan_at(Utc::now())
    }

    pub fn run_scheduled_scan_at(&self, now: DateTime<Utc>) -> MonitorResult<ScanSummary> {
        let report = self.scanner.scan_at(now)?;
        let config = self.scanner.config();
        let cutoff = now
            .checked_sub_signed(config.window())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut summary = ScanSummary {
            detected: report.threats.len(),
            recorded: 0,
            suppressed: 0,
            scan_time: report.scan_time,
        };

        for threat in report.threats {
            if config.suppress_duplicates
                && self.store.has_open_correlated(&threat.correlation_key, cutoff)?
            {
                summary.suppressed += 1;
                continue;
            }
            self.record(threat_event(threat, now))?;
            summary.recorded += 1;
        }

        if summary.recorded > 0 {
            warn!(
                detected = summary.detected,
                recorded = summary.recorded,
                suppressed = summary.suppressed,
                "scheduled scan recorded threats"
            );
        } else {
            info!(
                detected = summary.detected,
                suppressed = summary.suppressed,
                "scheduled scan complete"
            );
        }
        Ok(summary)
    }
}

fn threat_event(threat: Threat, now: DateTime<Utc>) -> NewSecurityEvent {
    let source_ip = threat
        .details
        .get("ip_address")
        .and_then(|ip| ip.as_str())
        .map(str::to_string);
    NewSecurityEvent::new(threat.threat_type, threat.severity)
        .with_source_ip(source_ip)
        .with_description(threat.description)
        .with_details(threat.details)
        .with_correlation_key(Some(threat.correlation_key))
        .at(now)
}
