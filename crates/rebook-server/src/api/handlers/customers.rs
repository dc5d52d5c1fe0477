use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{CreateCustomerRequest, Customer};
use crate::error::{AppError, Result};
use crate::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(business_id): Path<Uuid>,
) -> Result<Json<Vec<Customer>>> {
    state
        .repo
        .find_business(business_id)
        .await?
        .ok_or(AppError::BusinessNotFound(business_id))?;

    let customers = state.repo.list_customers(business_id).await?;
    Ok(Json(customers))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(business_id): Path<Uuid>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse> {
    state
        .repo
        .find_business(business_id)
        .await?
        .ok_or(AppError::BusinessNotFound(business_id))?;

    if req.phone.trim().is_empty() {
        return Err(AppError::Validation("phone must not be empty".into()));
    }

    let customer = state
        .repo
        .insert_customer(Customer {
            id: Uuid::new_v4(),
            business_id,
            name: req.name,
            phone: req.phone,
            email: req.email,
            marketing_opt_in: req.marketing_opt_in,
            last_visit_at: None,
            last_winback_sent_at: None,
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}
