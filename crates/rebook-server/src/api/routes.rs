use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{appointments, businesses, cron, customers, health, reviews};
use crate::AppState;

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "not_found",
                "message": "The requested endpoint does not exist"
            }
        })),
    )
}

pub fn build(state: Arc<AppState>) -> Router {
    let v1 = Router::new()
        .route("/businesses", get(businesses::list))
        .route("/businesses", post(businesses::create))
        .route("/businesses/:id", get(businesses::get))
        .route("/businesses/:id/settings", put(businesses::update_settings))
        .route("/businesses/:id/customers", get(customers::list))
        .route("/businesses/:id/customers", post(customers::create))
        .route("/businesses/:id/metrics", get(businesses::metrics))
        .route("/appointments", post(appointments::book))
        .route("/appointments/:id", get(appointments::get))
        .route("/appointments/:id/complete", post(appointments::complete))
        .route("/appointments/:id/cancel", post(appointments::cancel))
        .route("/appointments/:id/noshow", post(appointments::noshow))
        .route("/appointments/:id/reschedule", post(appointments::reschedule))
        .route("/review/:id", get(reviews::context))
        .route("/review/:id", post(reviews::submit));

    // Scheduler-facing triggers; everything else is unauthenticated by
    // design (sessions live in the web tier).
    let triggers = Router::new()
        .route("/reminders", post(cron::reminders))
        .route("/winback", post(cron::winback))
        .route("/weekly-report", post(cron::weekly_report))
        .layer(from_fn_with_state(state.clone(), cron::guard));

    let api = Router::new()
        .nest("/v1", v1)
        .nest("/internal/cron", triggers)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .fallback(fallback);

    api.with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(30)))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive()),
    )
}
