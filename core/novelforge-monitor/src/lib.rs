//! Security monitoring for NovelForge Sentinel.
//!
//! [`ThreatScanner`] detects threshold breaches over a trailing window and
//! has no side effects. [`SecurityMonitor`] records reported events, fans
//! high-severity events out to administrators, resolves events and runs the
//! scheduled scan that turns detected threats into recorded events.

mod config;
mod error;
mod monitor;
mod scanner;

pub use config::ScanConfig;
pub use error::{MonitorError, MonitorResult};
pub use monitor::{EventReport, ScanSummary, SecurityMonitor};
pub use scanner::{ScanReport, Threat, ThreatScanner};
