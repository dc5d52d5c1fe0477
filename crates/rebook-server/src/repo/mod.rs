pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Appointment, AppointmentStatus, Business, Customer, NewVisit, Visit};
use crate::error::Result;

/// Joined row for the reminder dispatcher: everything needed to build the
/// message without further lookups.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReminderCandidate {
    pub appointment_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub business_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WinbackCandidate {
    pub customer_id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub phone: String,
}

/// Durable store of businesses, customers, appointments and visits.
///
/// The mutating appointment/customer methods are conditional writes: they
/// succeed only when the row is still in the state the caller selected it
/// in, which is what keeps the batch dispatchers at-most-once-ish under
/// overlapping invocations.
#[async_trait]
pub trait Repository: Send + Sync {
    // Businesses
    async fn insert_business(&self, business: Business) -> Result<Business>;
    async fn find_business(&self, id: Uuid) -> Result<Option<Business>>;
    async fn find_business_by_owner(&self, owner_id: &str) -> Result<Option<Business>>;
    async fn list_businesses(&self) -> Result<Vec<Business>>;
    async fn update_business_settings(
        &self,
        id: Uuid,
        name: Option<String>,
        review_link: Option<String>,
    ) -> Result<Option<Business>>;

    // Customers
    async fn insert_customer(&self, customer: Customer) -> Result<Customer>;
    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>>;
    async fn list_customers(&self, business_id: Uuid) -> Result<Vec<Customer>>;
    async fn stamp_last_visit(&self, customer_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    /// Opted-in customers whose last visit predates `lapsed_before` and whose
    /// last win-back contact (if any) predates `cooled_before`. Customers who
    /// never completed a visit are not lapsed.
    async fn winback_candidates(
        &self,
        lapsed_before: DateTime<Utc>,
        cooled_before: DateTime<Utc>,
    ) -> Result<Vec<WinbackCandidate>>;

    /// Monotonic stamp of the win-back cooldown anchor. Returns false when
    /// the stamp would move backward, i.e. a later run already claimed the
    /// customer.
    async fn mark_winback_sent(&self, customer_id: Uuid, at: DateTime<Utc>) -> Result<bool>;

    async fn count_lapsed(&self, business_id: Uuid, lapsed_before: DateTime<Utc>)
        -> Result<u64>;
    async fn count_winbacks_since(&self, business_id: Uuid, since: DateTime<Utc>) -> Result<u64>;

    // Appointments
    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment>;
    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>>;
    async fn appointments_started_since(
        &self,
        business_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    /// Confirmed, un-reminded appointments with `start_time` in
    /// `[from, until)`.
    async fn reminder_candidates(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>>;

    /// Claims the reminder latch. Returns false when the appointment is
    /// already marked (or no longer confirmed), so the caller can report a
    /// duplicate-send-prevented skip instead of marking twice.
    async fn mark_reminder_sent(&self, appointment_id: Uuid) -> Result<bool>;

    /// Moves a confirmed appointment to a terminal state. Fails with
    /// `InvalidTransition` without mutating when the appointment has already
    /// left `confirmed`.
    async fn transition_appointment(
        &self,
        id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment>;

    /// The `confirmed -> confirmed` self-loop: new start time, reminder
    /// latch reset. Same legality rules as `transition_appointment`.
    async fn reschedule_appointment(
        &self,
        id: Uuid,
        new_time: DateTime<Utc>,
    ) -> Result<Appointment>;

    // Visits
    async fn insert_visit(&self, visit: NewVisit) -> Result<Visit>;
    async fn visits_for_appointments(&self, appointment_ids: &[Uuid]) -> Result<Vec<Visit>>;
}
