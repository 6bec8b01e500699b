//! AI usage accounting.

use crate::error::{AccountError, AccountResult};
use chrono::Utc;
use novelforge_storage::{BindingLedger, UsageLog};
use novelforge_types::{AiUsageRecord, Principal, UsageId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One AI call as reported by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub cost_estimate: f64,
}

pub struct UsageRecorder<S> {
    store: Arc<S>,
}

impl<S> UsageRecorder<S>
where
    S: BindingLedger + UsageLog,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Appends a usage record. The caller must own an active binding.
    pub fn record_ai_usage(
        &self,
        principal: &Principal,
        report: UsageReport,
    ) -> AccountResult<AiUsageRecord> {
        let provider = report.provider.trim();
        let model = report.model.trim();
        if provider.is_empty() || model.is_empty() {
            return Err(AccountError::InvalidRequest(
                "provider and model are required".to_string(),
            ));
        }
        if !report.cost_estimate.is_finite() || report.cost_estimate < 0.0 {
            return Err(AccountError::InvalidRequest(
                "costEstimate must be a non-negative number".to_string(),
            ));
        }

        if self
            .store
            .active_bindings_for_user(principal.user_id)?
            .is_empty()
        {
            return Err(AccountError::NoValidLicense);
        }

        let record = AiUsageRecord {
            id: UsageId::new(),
            user_id: principal.user_id,
            provider: provider.to_string(),
            model: model.to_string(),
            tokens_used: report.tokens_used,
            cost_estimate: report.cost_estimate,
            created_at: Utc::now(),
        };
        self.store.record_usage(&record)?;
        debug!(user_id = %principal.user_id, provider, model, "ai usage recorded");
        Ok(record)
    }
}
