use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::appointments;
use crate::domain::{Appointment, BookAppointmentRequest, RescheduleRequest};
use crate::error::{AppError, Result};
use crate::AppState;

pub async fn book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse> {
    let appointment = appointments::book(state.repo.as_ref(), req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>> {
    let appointment = state
        .repo
        .find_appointment(id)
        .await?
        .ok_or(AppError::AppointmentNotFound(id))?;

    Ok(Json(appointment))
}

pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>> {
    let appointment = appointments::complete(
        state.repo.as_ref(),
        state.gateway.as_deref(),
        &state.config.app_url,
        id,
        Utc::now(),
    )
    .await?;

    Ok(Json(appointment))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>> {
    let appointment = appointments::cancel(state.repo.as_ref(), id).await?;
    Ok(Json(appointment))
}

pub async fn noshow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>> {
    let appointment = appointments::mark_noshow(state.repo.as_ref(), id).await?;
    Ok(Json(appointment))
}

pub async fn reschedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<Appointment>> {
    let appointment = appointments::reschedule(state.repo.as_ref(), id, req.new_time).await?;
    Ok(Json(appointment))
}
