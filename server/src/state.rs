//! Shared application state.

use crate::error::{ApiError, ApiResult};
use novelforge_accounts::{AccountService, UsageRecorder};
use novelforge_license::{DeviceBinder, LicenseIssuer, LicenseVerifier};
use novelforge_monitor::{ScanConfig, SecurityMonitor};
use novelforge_storage::SqliteStore;
use std::sync::Arc;
use tracing::error;

/// Every service, wired to one store.
pub struct Services {
    pub verifier: LicenseVerifier<SqliteStore>,
    pub binder: DeviceBinder<SqliteStore>,
    pub issuer: LicenseIssuer<SqliteStore>,
    pub monitor: SecurityMonitor<SqliteStore>,
    pub accounts: AccountService<SqliteStore>,
    pub usage: UsageRecorder<SqliteStore>,
}

#[derive(Clone)]
pub struct AppState {
    services: Arc<Services>,
}

impl AppState {
    pub fn new(store: SqliteStore, scan: ScanConfig) -> Self {
        let store = Arc::new(store);
        let services = Services {
            verifier: LicenseVerifier::new(Arc::clone(&store)),
            binder: DeviceBinder::new(Arc::clone(&store)),
            issuer: LicenseIssuer::new(Arc::clone(&store)),
            monitor: SecurityMonitor::new(Arc::clone(&store), scan),
            accounts: AccountService::new(Arc::clone(&store)),
            usage: UsageRecorder::new(store),
        };
        Self {
            services: Arc::new(services),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }
}

/// Runs a store-bound closure on the blocking pool.
pub async fn run_blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Services) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let services = Arc::clone(&state.services);
    tokio::task::spawn_blocking(move || f(&services))
        .await
        .map_err(|e| {
            error!(error = %e, "blocking task failed");
            ApiError::internal("request could not be completed")
        })?
}
