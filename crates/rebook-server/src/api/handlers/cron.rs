use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::gateway::MessagingGateway;
use crate::jobs::{self, JobSummary};
use crate::AppState;

/// Bearer-token check for the scheduler-facing trigger endpoints.
pub async fn guard(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if token != state.config.cron_secret {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

fn gateway(state: &AppState) -> Result<Arc<dyn MessagingGateway>> {
    state.gateway.clone().ok_or_else(|| {
        AppError::Configuration(
            "WHATSAPP_ACCESS_TOKEN and WHATSAPP_PHONE_NUMBER_ID are not set".into(),
        )
    })
}

pub async fn reminders(State(state): State<Arc<AppState>>) -> Result<Json<JobSummary>> {
    let gateway = gateway(&state)?;
    let summary = jobs::reminder::run(
        state.repo.clone(),
        gateway,
        &state.config.app_url,
        state.config.reminder_policy(),
        Utc::now(),
    )
    .await?;

    Ok(Json(summary))
}

pub async fn winback(State(state): State<Arc<AppState>>) -> Result<Json<JobSummary>> {
    let gateway = gateway(&state)?;
    let summary = jobs::winback::run(
        state.repo.clone(),
        gateway,
        &state.config.app_url,
        state.config.winback_policy(),
        Utc::now(),
    )
    .await?;

    Ok(Json(summary))
}

pub async fn weekly_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<jobs::weekly_report::ReportSummary>> {
    let summary = jobs::weekly_report::run(
        state.repo.clone(),
        state.config.average_visit_value,
        Utc::now(),
    )
    .await?;

    Ok(Json(summary))
}
