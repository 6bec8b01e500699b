//! HTTP handlers.

use crate::auth::{Authenticated, ClientIp, MaybeAuthenticated};
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, run_blocking};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use novelforge_accounts::{NewAccount, UsageReport};
use novelforge_license::{BindRequest, GenerateLicenses};
use novelforge_monitor::EventReport;
use novelforge_types::{
    BindingId, DeviceFingerprint, DeviceInfo, EventId, LicenseStatus, LicenseUpdate, Role, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Json<Data<T>> {
    Json(Data { data })
}

fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, ok(data))
}

fn parse_id<T: FromStr>(raw: &str) -> ApiResult<T> {
    raw.parse()
        .map_err(|_| ApiError::invalid_request(format!("'{raw}' is not a valid id")))
}

// ── Health ───────────────────────────────────────────────────────

pub async fn health() -> impl IntoResponse {
    ok(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

// ── Devices ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBody {
    device_fingerprint: DeviceFingerprint,
}

pub async fn verify_device(
    State(state): State<AppState>,
    body: Result<Json<VerifyBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let verification = run_blocking(&state, move |s| {
        Ok(s.verifier.verify_device(&body.device_fingerprint)?)
    })
    .await?;
    Ok(ok(verification))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindBody {
    license_key: String,
    device_fingerprint: DeviceFingerprint,
    #[serde(default)]
    device_info: DeviceInfo,
}

pub async fn bind_device(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Result<Json<BindBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let request = BindRequest {
        license_key: body.license_key,
        fingerprint: body.device_fingerprint,
        device_info: body.device_info,
    };
    let receipt = run_blocking(&state, move |s| {
        Ok(s.binder.bind_device(request, &principal)?)
    })
    .await?;
    Ok(created(receipt))
}

pub async fn unbind_device(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let binding_id = parse_id::<BindingId>(&id)?;
    let binding = run_blocking(&state, move |s| {
        Ok(s.binder.unbind_device(binding_id, &principal)?)
    })
    .await?;
    Ok(ok(binding))
}

// ── Licenses ─────────────────────────────────────────────────────

pub async fn generate_licenses(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Result<Json<GenerateLicenses>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(params) = body?;
    let licenses = run_blocking(&state, move |s| {
        Ok(s.issuer.generate_licenses(&principal, params)?)
    })
    .await?;
    Ok(created(json!({ "licenses": licenses })))
}

pub async fn license_info(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let info = run_blocking(&state, move |s| Ok(s.issuer.license_info(&principal, &key)?)).await?;
    Ok(ok(info))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLicenseBody {
    status: Option<LicenseStatus>,
    tier: Option<String>,
    max_devices: Option<u32>,
    expires_at: Option<DateTime<Utc>>,
}

pub async fn update_license(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(key): Path<String>,
    body: Result<Json<UpdateLicenseBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let update = LicenseUpdate {
        status: body.status,
        tier: body.tier,
        max_devices: body.max_devices,
        expires_at: body.expires_at,
    };
    let license = run_blocking(&state, move |s| {
        Ok(s.issuer.update_license(&principal, &key, update)?)
    })
    .await?;
    Ok(ok(license))
}

// ── Security ─────────────────────────────────────────────────────

pub async fn report_event(
    State(state): State<AppState>,
    MaybeAuthenticated(principal): MaybeAuthenticated,
    ClientIp(ip): ClientIp,
    body: Result<Json<EventReport>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(mut report) = body?;
    if report.source_ip.is_none() {
        report.source_ip = ip;
    }
    let event = run_blocking(&state, move |s| {
        Ok(s.monitor.report_security_event(report, principal.as_ref())?)
    })
    .await?;
    Ok(created(event))
}

pub async fn resolve_event(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let event_id = parse_id::<EventId>(&id)?;
    let event = run_blocking(&state, move |s| {
        Ok(s.monitor.resolve_event(event_id, &principal)?)
    })
    .await?;
    Ok(ok(event))
}

pub async fn scan_threats(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<impl IntoResponse> {
    let report = run_blocking(&state, move |s| Ok(s.monitor.scan_threats_as(&principal)?)).await?;
    Ok(ok(report))
}

// ── Accounts ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapBody {
    email: String,
    full_name: String,
}

pub async fn bootstrap_admin(
    State(state): State<AppState>,
    body: Result<Json<BootstrapBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let issued = run_blocking(&state, move |s| {
        Ok(s.accounts.bootstrap_admin(&body.email, &body.full_name)?)
    })
    .await?;
    Ok(created(issued))
}

pub async fn create_user(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(account) = body?;
    let issued = run_blocking(&state, move |s| {
        Ok(s.accounts.create_user(&principal, account)?)
    })
    .await?;
    Ok(created(issued))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    role: Role,
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<RoleBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let target = parse_id::<UserId>(&id)?;
    let profile = run_blocking(&state, move |s| {
        Ok(s.accounts.update_user_role(&principal, target, body.role)?)
    })
    .await?;
    Ok(ok(profile))
}

// ── AI usage ─────────────────────────────────────────────────────

pub async fn record_ai_usage(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Result<Json<UsageReport>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(report) = body?;
    let record = run_blocking(&state, move |s| {
        Ok(s.usage.record_ai_usage(&principal, report)?)
    })
    .await?;
    Ok(created(record))
}
