use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Business, CreateBusinessRequest, UpdateSettingsRequest};
use crate::error::{AppError, Result};
use crate::metrics::{self, DashboardMetrics};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    owner: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Business>>> {
    // Owner resolution is exact: an unknown owner gets an empty list, never
    // somebody else's business.
    let businesses = match query.owner {
        Some(owner) => state
            .repo
            .find_business_by_owner(&owner)
            .await?
            .into_iter()
            .collect(),
        None => state.repo.list_businesses().await?,
    };
    Ok(Json(businesses))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBusinessRequest>,
) -> Result<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if req.owner_id.trim().is_empty() {
        return Err(AppError::Validation("owner_id must not be empty".into()));
    }

    let business = state
        .repo
        .insert_business(Business {
            id: Uuid::new_v4(),
            owner_id: req.owner_id,
            name: req.name,
            review_link: req.review_link,
            timezone: req.timezone.unwrap_or_else(|| "UTC".into()),
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(business)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Business>> {
    let business = state
        .repo
        .find_business(id)
        .await?
        .ok_or(AppError::BusinessNotFound(id))?;

    Ok(Json(business))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Business>> {
    let business = state
        .repo
        .update_business_settings(id, req.name, req.review_link)
        .await?
        .ok_or(AppError::BusinessNotFound(id))?;

    Ok(Json(business))
}

pub async fn metrics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardMetrics>> {
    let metrics = metrics::dashboard(
        state.repo.as_ref(),
        id,
        state.config.average_visit_value,
        chrono::Duration::days(state.config.winback_lapse_days),
        Utc::now(),
    )
    .await?;

    Ok(Json(metrics))
}
