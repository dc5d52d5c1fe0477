//! Read-only engagement rollups. Nothing here mutates the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Appointment, AppointmentStatus, Visit};
use crate::error::{AppError, Result};
use crate::repo::Repository;

pub const DASHBOARD_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub total_appointments: usize,
    pub no_shows: usize,
    /// Reminded and not lost: status still confirmed or completed with the
    /// reminder latch set.
    pub recovered: usize,
    pub revenue_saved: Decimal,
    /// Visits rated 4 or higher. Public ratings never create a Visit, so
    /// this undercounts reviews that went to the public destination.
    pub new_reviews: usize,
    pub lapsed_customers: u64,
    pub resurrected_this_month: u64,
}

/// An appointment counts as recovered when it was reminded and did not end
/// in a no-show or cancellation.
pub fn recovered_count(appointments: &[Appointment]) -> usize {
    appointments
        .iter()
        .filter(|a| {
            a.reminder_sent
                && matches!(
                    a.status,
                    AppointmentStatus::Confirmed | AppointmentStatus::Completed
                )
        })
        .count()
}

fn rollup(
    appointments: &[Appointment],
    visits: &[Visit],
    average_visit_value: Decimal,
) -> (usize, usize, usize, Decimal, usize) {
    let total = appointments.len();
    let no_shows = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Noshow)
        .count();
    let recovered = recovered_count(appointments);
    let revenue_saved = Decimal::from(recovered as u64) * average_visit_value;
    let new_reviews = visits.iter().filter(|v| v.rating >= 4).count();
    (total, no_shows, recovered, revenue_saved, new_reviews)
}

/// Trailing-window dashboard rollup for one business.
pub async fn dashboard(
    repo: &dyn Repository,
    business_id: Uuid,
    average_visit_value: Decimal,
    lapse: chrono::Duration,
    now: DateTime<Utc>,
) -> Result<DashboardMetrics> {
    repo.find_business(business_id)
        .await?
        .ok_or(AppError::BusinessNotFound(business_id))?;

    let window_start = now - chrono::Duration::days(DASHBOARD_WINDOW_DAYS);
    let appointments = repo
        .appointments_started_since(business_id, window_start)
        .await?;

    let appointment_ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();
    let visits = repo.visits_for_appointments(&appointment_ids).await?;

    let (total_appointments, no_shows, recovered, revenue_saved, new_reviews) =
        rollup(&appointments, &visits, average_visit_value);

    let lapsed_customers = repo.count_lapsed(business_id, now - lapse).await?;
    let resurrected_this_month = repo.count_winbacks_since(business_id, window_start).await?;

    Ok(DashboardMetrics {
        total_appointments,
        no_shows,
        recovered,
        revenue_saved,
        new_reviews,
        lapsed_customers,
        resurrected_this_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(status: AppointmentStatus, reminder_sent: bool) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            start_time: Utc::now(),
            status,
            reminder_sent,
            created_at: Utc::now(),
        }
    }

    fn visit(rating: i32) -> Visit {
        Visit {
            id: Uuid::new_v4(),
            appointment_id: Uuid::new_v4(),
            rating,
            feedback: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn recovered_needs_reminder_and_a_live_status() {
        let appointments = vec![
            appointment(AppointmentStatus::Confirmed, true),
            appointment(AppointmentStatus::Completed, true),
            appointment(AppointmentStatus::Noshow, true),
            appointment(AppointmentStatus::Cancelled, true),
            appointment(AppointmentStatus::Confirmed, false),
        ];
        assert_eq!(recovered_count(&appointments), 2);
    }

    #[test]
    fn rollup_prices_recovered_slots() {
        let appointments = vec![
            appointment(AppointmentStatus::Completed, true),
            appointment(AppointmentStatus::Confirmed, true),
            appointment(AppointmentStatus::Noshow, false),
        ];
        let visits = vec![visit(5), visit(4), visit(2)];

        let (total, no_shows, recovered, revenue, new_reviews) =
            rollup(&appointments, &visits, Decimal::from(750));

        assert_eq!(total, 3);
        assert_eq!(no_shows, 1);
        assert_eq!(recovered, 2);
        assert_eq!(revenue, Decimal::from(1500));
        assert_eq!(new_reviews, 2);
    }

    #[test]
    fn empty_window_rolls_up_to_zero() {
        let (total, no_shows, recovered, revenue, new_reviews) =
            rollup(&[], &[], Decimal::from(1000));
        assert_eq!(
            (total, no_shows, recovered, new_reviews),
            (0, 0, 0, 0)
        );
        assert_eq!(revenue, Decimal::ZERO);
    }
}
