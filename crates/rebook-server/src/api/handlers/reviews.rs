use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::reviews::{self, RatingOutcome, ReviewContext};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRatingRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

pub async fn context(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewContext>> {
    let context = reviews::context(state.repo.as_ref(), id).await?;
    Ok(Json(context))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRatingRequest>,
) -> Result<Json<RatingOutcome>> {
    let outcome = reviews::submit_rating(
        state.repo.as_ref(),
        &state.config.app_url,
        id,
        req.rating,
        req.comment,
    )
    .await?;

    Ok(Json(outcome))
}
