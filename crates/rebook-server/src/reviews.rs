//! The post-visit review flow: one rating in, either a public redirect or a
//! private feedback capture out.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    branch_for_rating, referral_link, share_message, whatsapp_share_url, NewVisit, ReviewBranch,
};
use crate::error::{AppError, Result};
use crate::repo::Repository;

/// What the rating screen needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewContext {
    pub appointment_id: Uuid,
    pub customer_name: String,
    pub business_name: String,
    pub has_public_destination: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "branch", rename_all = "lowercase")]
pub enum RatingOutcome {
    /// Happy path: point the customer at the public destination and hand
    /// them a share artifact. Nothing is persisted.
    Redirect {
        review_url: Option<String>,
        referral_link: String,
        share_url: String,
    },
    /// Unhappy path: feedback captured privately for the owner.
    Feedback { visit_id: Uuid },
}

pub async fn context(repo: &dyn Repository, appointment_id: Uuid) -> Result<ReviewContext> {
    let appointment = repo
        .find_appointment(appointment_id)
        .await?
        .ok_or(AppError::AppointmentNotFound(appointment_id))?;
    let customer = repo
        .find_customer(appointment.customer_id)
        .await?
        .ok_or(AppError::CustomerNotFound(appointment.customer_id))?;
    let business = repo
        .find_business(appointment.business_id)
        .await?
        .ok_or(AppError::BusinessNotFound(appointment.business_id))?;

    Ok(ReviewContext {
        appointment_id,
        customer_name: customer.name,
        business_name: business.name,
        has_public_destination: business.review_link.is_some(),
    })
}

/// Routes one star rating. Repeat submissions for the same appointment are
/// allowed; there is no uniqueness rule on visits.
pub async fn submit_rating(
    repo: &dyn Repository,
    app_url: &str,
    appointment_id: Uuid,
    rating: i32,
    comment: Option<String>,
) -> Result<RatingOutcome> {
    let branch = branch_for_rating(rating).ok_or(AppError::InvalidRating(rating))?;

    let appointment = repo
        .find_appointment(appointment_id)
        .await?
        .ok_or(AppError::AppointmentNotFound(appointment_id))?;
    let customer = repo
        .find_customer(appointment.customer_id)
        .await?
        .ok_or(AppError::CustomerNotFound(appointment.customer_id))?;

    match branch {
        ReviewBranch::Redirect => {
            let business = repo
                .find_business(appointment.business_id)
                .await?
                .ok_or(AppError::BusinessNotFound(appointment.business_id))?;

            let referral = referral_link(app_url, &customer.phone);
            let share_url = whatsapp_share_url(&share_message(&business.name, &referral));

            Ok(RatingOutcome::Redirect {
                review_url: business.review_link,
                referral_link: referral,
                share_url,
            })
        }
        ReviewBranch::Feedback => {
            let visit = repo
                .insert_visit(NewVisit {
                    appointment_id,
                    rating,
                    feedback: comment,
                })
                .await?;

            Ok(RatingOutcome::Feedback { visit_id: visit.id })
        }
    }
}
