use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Appointment, AppointmentStatus, Business, Customer, NewVisit, Visit};
use crate::error::{AppError, Result};

use super::{ReminderCandidate, Repository, WinbackCandidate};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn insert_business(&self, business: Business) -> Result<Business> {
        let business: Business = sqlx::query_as(
            r#"
            INSERT INTO businesses (id, owner_id, name, review_link, timezone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(business.id)
        .bind(&business.owner_id)
        .bind(&business.name)
        .bind(&business.review_link)
        .bind(&business.timezone)
        .bind(business.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(business)
    }

    async fn find_business(&self, id: Uuid) -> Result<Option<Business>> {
        let business: Option<Business> = sqlx::query_as("SELECT * FROM businesses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(business)
    }

    async fn find_business_by_owner(&self, owner_id: &str) -> Result<Option<Business>> {
        let business: Option<Business> =
            sqlx::query_as("SELECT * FROM businesses WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(business)
    }

    async fn list_businesses(&self) -> Result<Vec<Business>> {
        let businesses: Vec<Business> =
            sqlx::query_as("SELECT * FROM businesses ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(businesses)
    }

    async fn update_business_settings(
        &self,
        id: Uuid,
        name: Option<String>,
        review_link: Option<String>,
    ) -> Result<Option<Business>> {
        let business: Option<Business> = sqlx::query_as(
            r#"
            UPDATE businesses
            SET name = COALESCE($2, name),
                review_link = COALESCE($3, review_link)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&review_link)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn insert_customer(&self, customer: Customer) -> Result<Customer> {
        let customer: Customer = sqlx::query_as(
            r#"
            INSERT INTO customers
                (id, business_id, name, phone, email, marketing_opt_in,
                 last_visit_at, last_winback_sent_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(customer.id)
        .bind(customer.business_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.marketing_opt_in)
        .bind(customer.last_visit_at)
        .bind(customer.last_winback_sent_at)
        .bind(customer.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        let customer: Option<Customer> = sqlx::query_as("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn list_customers(&self, business_id: Uuid) -> Result<Vec<Customer>> {
        let customers: Vec<Customer> =
            sqlx::query_as("SELECT * FROM customers WHERE business_id = $1 ORDER BY created_at")
                .bind(business_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(customers)
    }

    async fn stamp_last_visit(&self, customer_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE customers SET last_visit_at = $2 WHERE id = $1")
            .bind(customer_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn winback_candidates(
        &self,
        lapsed_before: DateTime<Utc>,
        cooled_before: DateTime<Utc>,
    ) -> Result<Vec<WinbackCandidate>> {
        let candidates: Vec<WinbackCandidate> = sqlx::query_as(
            r#"
            SELECT id AS customer_id, business_id, name, phone
            FROM customers
            WHERE marketing_opt_in = true
              AND last_visit_at < $1
              AND (last_winback_sent_at IS NULL OR last_winback_sent_at < $2)
            ORDER BY last_visit_at
            "#,
        )
        .bind(lapsed_before)
        .bind(cooled_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    async fn mark_winback_sent(&self, customer_id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET last_winback_sent_at = $2
            WHERE id = $1
              AND (last_winback_sent_at IS NULL OR last_winback_sent_at <= $2)
            "#,
        )
        .bind(customer_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_lapsed(
        &self,
        business_id: Uuid,
        lapsed_before: DateTime<Utc>,
    ) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE business_id = $1 AND last_visit_at < $2",
        )
        .bind(business_id)
        .bind(lapsed_before)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn count_winbacks_since(&self, business_id: Uuid, since: DateTime<Utc>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE business_id = $1 AND last_winback_sent_at >= $2",
        )
        .bind(business_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment> {
        let appointment: Appointment = sqlx::query_as(
            r#"
            INSERT INTO appointments
                (id, business_id, customer_id, start_time, status, reminder_sent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.business_id)
        .bind(appointment.customer_id)
        .bind(appointment.start_time)
        .bind(appointment.status)
        .bind(appointment.reminder_sent)
        .bind(appointment.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        let appointment: Option<Appointment> =
            sqlx::query_as("SELECT * FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(appointment)
    }

    async fn appointments_started_since(
        &self,
        business_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let appointments: Vec<Appointment> = sqlx::query_as(
            "SELECT * FROM appointments WHERE business_id = $1 AND start_time >= $2",
        )
        .bind(business_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn reminder_candidates(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>> {
        let candidates: Vec<ReminderCandidate> = sqlx::query_as(
            r#"
            SELECT a.id AS appointment_id,
                   a.start_time,
                   c.name AS customer_name,
                   c.phone AS customer_phone,
                   b.name AS business_name
            FROM appointments a
            JOIN customers c ON c.id = a.customer_id
            JOIN businesses b ON b.id = a.business_id
            WHERE a.status = 'confirmed'
              AND a.reminder_sent = false
              AND a.start_time >= $1
              AND a.start_time < $2
            ORDER BY a.start_time
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    async fn mark_reminder_sent(&self, appointment_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET reminder_sent = true
            WHERE id = $1 AND status = 'confirmed' AND reminder_sent = false
            "#,
        )
        .bind(appointment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn transition_appointment(
        &self,
        id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment> {
        let updated: Option<Appointment> = sqlx::query_as(
            "UPDATE appointments SET status = $2 WHERE id = $1 AND status = 'confirmed' RETURNING *",
        )
        .bind(id)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(appointment) => Ok(appointment),
            None => match self.find_appointment(id).await? {
                Some(existing) => Err(AppError::InvalidTransition {
                    from: existing.status,
                    to,
                }),
                None => Err(AppError::AppointmentNotFound(id)),
            },
        }
    }

    async fn reschedule_appointment(
        &self,
        id: Uuid,
        new_time: DateTime<Utc>,
    ) -> Result<Appointment> {
        let updated: Option<Appointment> = sqlx::query_as(
            r#"
            UPDATE appointments
            SET start_time = $2, status = 'confirmed', reminder_sent = false
            WHERE id = $1 AND status = 'confirmed'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_time)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(appointment) => Ok(appointment),
            None => match self.find_appointment(id).await? {
                Some(existing) => Err(AppError::InvalidTransition {
                    from: existing.status,
                    to: AppointmentStatus::Confirmed,
                }),
                None => Err(AppError::AppointmentNotFound(id)),
            },
        }
    }

    async fn insert_visit(&self, visit: NewVisit) -> Result<Visit> {
        let visit: Visit = sqlx::query_as(
            r#"
            INSERT INTO visits (id, appointment_id, rating, feedback, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(visit.appointment_id)
        .bind(visit.rating)
        .bind(&visit.feedback)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(visit)
    }

    async fn visits_for_appointments(&self, appointment_ids: &[Uuid]) -> Result<Vec<Visit>> {
        if appointment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let visits: Vec<Visit> =
            sqlx::query_as("SELECT * FROM visits WHERE appointment_id = ANY($1)")
                .bind(appointment_ids)
                .fetch_all(&self.pool)
                .await?;

        Ok(visits)
    }
}
