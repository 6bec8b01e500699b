//! Scan configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Thresholds and window for the threat scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Length of the trailing window, in seconds.
    pub window_secs: u64,
    /// Login failures from one address that make a brute-force threat.
    pub brute_force_threshold: usize,
    /// AI calls by one account that make an abuse threat.
    pub api_abuse_threshold: usize,
    /// Device activations by one account that make a suspicious-activity threat.
    pub activation_threshold: usize,
    /// Skip recording a threat that already has an unresolved event in the window.
    pub suppress_duplicates: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_secs: 3600,
            brute_force_threshold: 5,
            api_abuse_threshold: 100,
            activation_threshold: 5,
            suppress_duplicates: true,
        }
    }
}

impl ScanConfig {
    /// The window as a chrono duration, saturating on absurd values.
    #[must_use]
    pub fn window(&self) -> Duration {
        i64::try_from(self.window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.window(), Duration::hours(1));
        assert_eq!(config.brute_force_threshold, 5);
        assert_eq!(config.api_abuse_threshold, 100);
        assert_eq!(config.activation_threshold, 5);
        assert!(config.suppress_duplicates);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"window_secs": 60}"#).unwrap();
        assert_eq!(config.window(), Duration::minutes(1));
        assert_eq!(config.brute_force_threshold, 5);
    }
}
