//! Appointment lifecycle operations, shared by the HTTP handlers and the
//! tests. Status legality is enforced by the repository's conditional
//! writes; this layer owns the side effects around them.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Appointment, AppointmentStatus, BookAppointmentRequest};
use crate::error::{AppError, Result};
use crate::gateway::{MessagingGateway, TEMPLATE_REVIEW_REQUEST};
use crate::repo::Repository;

pub async fn book(
    repo: &dyn Repository,
    req: BookAppointmentRequest,
    now: DateTime<Utc>,
) -> Result<Appointment> {
    repo.find_business(req.business_id)
        .await?
        .ok_or(AppError::BusinessNotFound(req.business_id))?;
    let customer = repo
        .find_customer(req.customer_id)
        .await?
        .ok_or(AppError::CustomerNotFound(req.customer_id))?;

    if customer.business_id != req.business_id {
        return Err(AppError::Validation(
            "customer belongs to a different business".into(),
        ));
    }

    repo.insert_appointment(Appointment::book(
        req.business_id,
        req.customer_id,
        req.start_time,
        now,
    ))
    .await
}

/// `confirmed -> completed`: stamps the customer's last visit and asks them
/// for a review. The review request is best-effort; a gateway failure is
/// logged and the completion stands.
pub async fn complete(
    repo: &dyn Repository,
    gateway: Option<&dyn MessagingGateway>,
    app_url: &str,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Appointment> {
    let appointment = repo
        .transition_appointment(id, AppointmentStatus::Completed)
        .await?;
    repo.stamp_last_visit(appointment.customer_id, now).await?;

    match gateway {
        Some(gateway) => send_review_request(repo, gateway, app_url, &appointment).await,
        None => warn!(appointment_id = %id, "gateway unconfigured, review request skipped"),
    }

    Ok(appointment)
}

async fn send_review_request(
    repo: &dyn Repository,
    gateway: &dyn MessagingGateway,
    app_url: &str,
    appointment: &Appointment,
) {
    let context = async {
        let customer = repo
            .find_customer(appointment.customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound(appointment.customer_id))?;
        let business = repo
            .find_business(appointment.business_id)
            .await?
            .ok_or(AppError::BusinessNotFound(appointment.business_id))?;
        Ok::<_, AppError>((customer, business))
    };

    let (customer, business) = match context.await {
        Ok(pair) => pair,
        Err(e) => {
            warn!(appointment_id = %appointment.id, error = %e, "review request context missing");
            return;
        }
    };

    let params = vec![
        customer.name,
        business.name,
        format!("{app_url}/review/{}", appointment.id),
    ];

    if let Err(e) = gateway
        .send_template(&customer.phone, TEMPLATE_REVIEW_REQUEST, &params)
        .await
    {
        warn!(appointment_id = %appointment.id, error = %e, "review request send failed");
    }
}

pub async fn cancel(repo: &dyn Repository, id: Uuid) -> Result<Appointment> {
    repo.transition_appointment(id, AppointmentStatus::Cancelled)
        .await
}

pub async fn mark_noshow(repo: &dyn Repository, id: Uuid) -> Result<Appointment> {
    repo.transition_appointment(id, AppointmentStatus::Noshow)
        .await
}

/// The self-loop: new start time, back to confirmed, reminder latch cleared
/// so the customer is re-reminded for the new slot.
pub async fn reschedule(
    repo: &dyn Repository,
    id: Uuid,
    new_time: DateTime<Utc>,
) -> Result<Appointment> {
    repo.reschedule_appointment(id, new_time).await
}
