use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::gateway::{MessagingGateway, TEMPLATE_WINBACK};
use crate::repo::{Repository, WinbackCandidate};

use super::{ItemOutcome, JobSummary, WinbackPolicy};

const SEND_DEADLINE: Duration = Duration::from_secs(15);

/// One win-back run: contact opted-in customers who lapsed past the
/// threshold and are outside the cooldown, then stamp the outreach time.
///
/// The lapse threshold keeps recently active customers out; the cooldown
/// keeps already-contacted customers from being nagged before they had a
/// chance to return. The stamp is monotonic, so a customer is never
/// "un-contacted" by an overlapping run.
pub async fn run(
    repo: Arc<dyn Repository>,
    gateway: Arc<dyn MessagingGateway>,
    app_url: &str,
    policy: WinbackPolicy,
    now: DateTime<Utc>,
) -> Result<JobSummary> {
    let lapsed_before = now - policy.lapse;
    let cooled_before = now - policy.cooldown;

    let candidates = repo.winback_candidates(lapsed_before, cooled_before).await?;
    info!(candidates = candidates.len(), "win-back run selected lapsed customers");

    let mut tasks = JoinSet::new();
    for candidate in candidates {
        let repo = repo.clone();
        let gateway = gateway.clone();
        let app_url = app_url.to_string();
        tasks.spawn(async move { process(repo, gateway, &app_url, candidate, now).await });
    }

    let mut details = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => details.push(outcome),
            Err(e) => error!(error = %e, "win-back task panicked"),
        }
    }

    let summary = JobSummary::from_details(details);
    info!(
        processed = summary.processed,
        sent = summary.sent,
        failed = summary.failed,
        skipped = summary.skipped,
        "win-back run finished"
    );
    Ok(summary)
}

async fn process(
    repo: Arc<dyn Repository>,
    gateway: Arc<dyn MessagingGateway>,
    app_url: &str,
    candidate: WinbackCandidate,
    now: DateTime<Utc>,
) -> ItemOutcome {
    let id = candidate.customer_id;

    // Customer.business_id is required, so a missing business is a data
    // defect; skip rather than fail the item.
    let business = match repo.find_business(candidate.business_id).await {
        Ok(Some(business)) => business,
        Ok(None) => {
            warn!(customer_id = %id, business_id = %candidate.business_id, "win-back candidate has no business");
            return ItemOutcome::skipped(id, "no-business");
        }
        Err(e) => return ItemOutcome::failed(id, e.to_string()),
    };

    let params = vec![
        candidate.name,
        business.name,
        format!("{app_url}/book"),
    ];

    let send = gateway.send_template(&candidate.phone, TEMPLATE_WINBACK, &params);
    match tokio::time::timeout(SEND_DEADLINE, send).await {
        Err(_) => {
            warn!(customer_id = %id, "win-back send exceeded deadline");
            ItemOutcome::failed(id, format!("send exceeded {SEND_DEADLINE:?}"))
        }
        Ok(Err(e)) => {
            warn!(customer_id = %id, error = %e, "win-back send failed");
            ItemOutcome::failed(id, e.to_string())
        }
        Ok(Ok(())) => match repo.mark_winback_sent(id, now).await {
            Ok(true) => ItemOutcome::sent(id),
            Ok(false) => {
                warn!(customer_id = %id, "duplicate send prevented: win-back already stamped later");
                ItemOutcome::skipped(id, "already-stamped")
            }
            Err(e) => {
                error!(customer_id = %id, error = %e, "win-back sent but stamp write failed");
                ItemOutcome::failed(id, format!("stamp write failed: {e}"))
            }
        },
    }
}
