use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Private feedback record. Only the feedback branch of the review flow
/// creates these; public ratings redirect without persisting anything.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Visit {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub rating: i32,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVisit {
    pub appointment_id: Uuid,
    pub rating: i32,
    pub feedback: Option<String>,
}
