mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use rebook_server::domain::{AppointmentStatus, NewVisit};
use rebook_server::error::AppError;
use rebook_server::jobs;
use rebook_server::metrics;
use rebook_server::repo::Repository;

use common::{business, confirmed_appointment, customer, MemoryRepository};

fn lapse() -> Duration {
    Duration::days(60)
}

#[tokio::test]
async fn dashboard_rolls_up_the_trailing_window() {
    let repo = MemoryRepository::new();
    let now = Utc::now();

    let biz = repo.insert_business(business("Glow Salon")).await.unwrap();
    let cust = repo
        .insert_customer(customer(biz.id, "Asha", "+919876543210"))
        .await
        .unwrap();

    // Recovered: reminded and completed.
    let mut recovered = confirmed_appointment(biz.id, cust.id, now - Duration::days(5));
    recovered.status = AppointmentStatus::Completed;
    recovered.reminder_sent = true;
    let recovered = repo.insert_appointment(recovered).await.unwrap();

    // Reminded but still upcoming inside the window: also recovered.
    let mut upcoming = confirmed_appointment(biz.id, cust.id, now + Duration::days(1));
    upcoming.reminder_sent = true;
    repo.insert_appointment(upcoming).await.unwrap();

    // No-show, reminded: lost, not recovered.
    let mut noshow = confirmed_appointment(biz.id, cust.id, now - Duration::days(3));
    noshow.status = AppointmentStatus::Noshow;
    noshow.reminder_sent = true;
    repo.insert_appointment(noshow).await.unwrap();

    // Outside the 30-day window: invisible to the dashboard.
    let mut old = confirmed_appointment(biz.id, cust.id, now - Duration::days(45));
    old.status = AppointmentStatus::Completed;
    old.reminder_sent = true;
    repo.insert_appointment(old).await.unwrap();

    // A four-star visit record counts as a new review.
    repo.insert_visit(NewVisit {
        appointment_id: recovered.id,
        rating: 4,
        feedback: None,
    })
    .await
    .unwrap();
    repo.insert_visit(NewVisit {
        appointment_id: recovered.id,
        rating: 2,
        feedback: Some("slow".into()),
    })
    .await
    .unwrap();

    let dashboard = metrics::dashboard(
        repo.as_ref(),
        biz.id,
        Decimal::from(1000),
        lapse(),
        now,
    )
    .await
    .unwrap();

    assert_eq!(dashboard.total_appointments, 3);
    assert_eq!(dashboard.no_shows, 1);
    assert_eq!(dashboard.recovered, 2);
    assert_eq!(dashboard.revenue_saved, Decimal::from(2000));
    assert_eq!(dashboard.new_reviews, 1);
}

#[tokio::test]
async fn revenue_saved_scales_with_the_configured_value() {
    let repo = MemoryRepository::new();
    let now = Utc::now();

    let biz = repo.insert_business(business("Glow Salon")).await.unwrap();
    let cust = repo
        .insert_customer(customer(biz.id, "Asha", "+919876543210"))
        .await
        .unwrap();
    let mut appointment = confirmed_appointment(biz.id, cust.id, now - Duration::days(1));
    appointment.status = AppointmentStatus::Completed;
    appointment.reminder_sent = true;
    repo.insert_appointment(appointment).await.unwrap();

    let dashboard = metrics::dashboard(
        repo.as_ref(),
        biz.id,
        Decimal::new(4950, 2), // 49.50
        lapse(),
        now,
    )
    .await
    .unwrap();

    assert_eq!(dashboard.revenue_saved, Decimal::new(4950, 2));
}

#[tokio::test]
async fn winback_health_counts_lapsed_and_resurrected() {
    let repo = MemoryRepository::new();
    let now = Utc::now();

    let biz = repo.insert_business(business("Glow Salon")).await.unwrap();

    let mut lapsed = customer(biz.id, "Asha", "+911111111111");
    lapsed.last_visit_at = Some(now - Duration::days(90));
    repo.insert_customer(lapsed).await.unwrap();

    let mut resurrected = customer(biz.id, "Ravi", "+912222222222");
    resurrected.last_visit_at = Some(now - Duration::days(70));
    resurrected.last_winback_sent_at = Some(now - Duration::days(10));
    repo.insert_customer(resurrected).await.unwrap();

    let mut active = customer(biz.id, "Meera", "+913333333333");
    active.last_visit_at = Some(now - Duration::days(5));
    repo.insert_customer(active).await.unwrap();

    let dashboard = metrics::dashboard(
        repo.as_ref(),
        biz.id,
        Decimal::from(1000),
        lapse(),
        now,
    )
    .await
    .unwrap();

    assert_eq!(dashboard.lapsed_customers, 2);
    assert_eq!(dashboard.resurrected_this_month, 1);
}

#[tokio::test]
async fn unknown_business_is_not_found() {
    let repo = MemoryRepository::new();
    let missing = Uuid::new_v4();

    let err = metrics::dashboard(
        repo.as_ref(),
        missing,
        Decimal::from(1000),
        lapse(),
        Utc::now(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::BusinessNotFound(id) if id == missing));
}

#[tokio::test]
async fn weekly_report_skips_businesses_with_nothing_recovered() {
    let repo = MemoryRepository::new();
    let now = Utc::now();

    let busy = repo.insert_business(business("Glow Salon")).await.unwrap();
    let quiet = repo.insert_business(business("Fade Barbers")).await.unwrap();

    let cust = repo
        .insert_customer(customer(busy.id, "Asha", "+919876543210"))
        .await
        .unwrap();
    let mut recovered = confirmed_appointment(busy.id, cust.id, now - Duration::days(2));
    recovered.status = AppointmentStatus::Completed;
    recovered.reminder_sent = true;
    repo.insert_appointment(recovered).await.unwrap();

    let summary = jobs::weekly_report::run(repo.clone(), Decimal::from(1000), now)
        .await
        .unwrap();

    assert_eq!(summary.reports_generated, 1);
    assert_eq!(summary.details[0].business_id, busy.id);
    assert_eq!(summary.details[0].recovered, 1);
    assert_eq!(summary.details[0].revenue_saved, Decimal::from(1000));
    assert!(!summary.details.iter().any(|d| d.business_id == quiet.id));
}
