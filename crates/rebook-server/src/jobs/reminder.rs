use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::gateway::{MessagingGateway, TEMPLATE_REMINDER};
use crate::repo::{ReminderCandidate, Repository};

use super::{ItemOutcome, JobSummary, ReminderPolicy};

/// Upper bound on a single gateway call so one stuck send cannot stall the
/// batch.
const SEND_DEADLINE: Duration = Duration::from_secs(15);

/// One reminder run: select confirmed, un-reminded appointments entering the
/// lead-time window, send each customer a reminder, latch `reminder_sent` on
/// success.
///
/// The select-send-mark sequence is best-effort: the mark is a conditional
/// write, so a concurrent run that already latched the flag downgrades the
/// item to a skipped duplicate instead of marking twice. Failures leave the
/// flag untouched; the appointment stays eligible while it remains inside
/// the window and is silently missed after that.
pub async fn run(
    repo: Arc<dyn Repository>,
    gateway: Arc<dyn MessagingGateway>,
    app_url: &str,
    policy: ReminderPolicy,
    now: DateTime<Utc>,
) -> Result<JobSummary> {
    let from = now + policy.lead;
    let until = from + policy.window;

    let candidates = repo.reminder_candidates(from, until).await?;
    info!(
        candidates = candidates.len(),
        %from,
        %until,
        "reminder run selected window"
    );

    let mut tasks = JoinSet::new();
    for candidate in candidates {
        let repo = repo.clone();
        let gateway = gateway.clone();
        let app_url = app_url.to_string();
        tasks.spawn(async move { process(repo, gateway, &app_url, candidate).await });
    }

    let mut details = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => details.push(outcome),
            Err(e) => error!(error = %e, "reminder task panicked"),
        }
    }

    let summary = JobSummary::from_details(details);
    info!(
        processed = summary.processed,
        sent = summary.sent,
        failed = summary.failed,
        skipped = summary.skipped,
        "reminder run finished"
    );
    Ok(summary)
}

async fn process(
    repo: Arc<dyn Repository>,
    gateway: Arc<dyn MessagingGateway>,
    app_url: &str,
    candidate: ReminderCandidate,
) -> ItemOutcome {
    let id = candidate.appointment_id;
    let params = vec![
        candidate.customer_name,
        candidate.business_name,
        candidate.start_time.format("%a %e %b, %H:%M").to_string(),
        format!("{app_url}/book/{id}"),
    ];

    let send = gateway.send_template(&candidate.customer_phone, TEMPLATE_REMINDER, &params);
    match tokio::time::timeout(SEND_DEADLINE, send).await {
        Err(_) => {
            warn!(appointment_id = %id, "reminder send exceeded deadline");
            ItemOutcome::failed(id, format!("send exceeded {SEND_DEADLINE:?}"))
        }
        Ok(Err(e)) => {
            warn!(appointment_id = %id, error = %e, "reminder send failed");
            ItemOutcome::failed(id, e.to_string())
        }
        Ok(Ok(())) => match repo.mark_reminder_sent(id).await {
            Ok(true) => ItemOutcome::sent(id),
            Ok(false) => {
                warn!(appointment_id = %id, "duplicate send prevented: reminder already latched");
                ItemOutcome::skipped(id, "already-marked")
            }
            Err(e) => {
                error!(appointment_id = %id, error = %e, "reminder sent but latch write failed");
                ItemOutcome::failed(id, format!("latch write failed: {e}"))
            }
        },
    }
}
