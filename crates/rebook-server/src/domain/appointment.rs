use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
    Noshow,
    Completed,
}

impl AppointmentStatus {
    /// Cancelled, no-show and completed accept no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, AppointmentStatus::Confirmed)
    }

    /// The only legal moves are out of `Confirmed`: to a terminal state, or
    /// back to `Confirmed` itself (a reschedule).
    pub fn can_transition_to(self, _to: AppointmentStatus) -> bool {
        !self.is_terminal()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub customer_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    /// One-way latch: flipped true by a successful reminder send, reset to
    /// false only by a reschedule.
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn book(
        business_id: Uuid,
        customer_id: Uuid,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            business_id,
            customer_id,
            start_time,
            status: AppointmentStatus::Confirmed,
            reminder_sent: false,
            created_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub business_id: Uuid,
    pub customer_id: Uuid,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub new_time: DateTime<Utc>,
}
