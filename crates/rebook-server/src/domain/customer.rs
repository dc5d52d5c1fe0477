use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub marketing_opt_in: bool,
    /// Stamped only when an appointment completes. Null for customers who
    /// never showed up, so they are never considered lapsed.
    pub last_visit_at: Option<DateTime<Utc>>,
    /// Cooldown anchor for win-back outreach. Monotonic: once set it only
    /// moves forward.
    pub last_winback_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default = "default_opt_in")]
    pub marketing_opt_in: bool,
}

fn default_opt_in() -> bool {
    true
}
