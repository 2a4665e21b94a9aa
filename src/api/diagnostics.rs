//! Lock diagnostic endpoints (advisory, point-in-time)

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::diagnostics::{DeadlockReport, LockSnapshot, LockStatus},
    AppState,
};

use super::blocking;

/// Probe whether the catalog write lock is free right now
#[utoipa::path(
    get,
    path = "/diagnostics/lock",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Free or held at the instant of the probe", body = LockStatus)
    )
)]
pub async fn lock_status(State(state): State<AppState>) -> AppResult<Json<LockStatus>> {
    let diagnostics = state.services.diagnostics.clone();
    let status = blocking(move || Ok(diagnostics.lock_status())).await?;
    Ok(Json(status))
}

/// Heuristic deadlock signal; not a real cycle detector
#[utoipa::path(
    get,
    path = "/diagnostics/deadlock",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Clear or suspect", body = DeadlockReport)
    )
)]
pub async fn deadlock_check(State(state): State<AppState>) -> Json<DeadlockReport> {
    Json(state.services.diagnostics.deadlock_check())
}

/// Raw lock counters and busy flags
#[utoipa::path(
    get,
    path = "/diagnostics/snapshot",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Lock counters", body = LockSnapshot)
    )
)]
pub async fn lock_snapshot(State(state): State<AppState>) -> Json<LockSnapshot> {
    Json(state.services.diagnostics.lock_snapshot())
}
