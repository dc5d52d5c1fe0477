use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::metrics::recovered_count;
use crate::repo::Repository;

const REPORT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub business_id: Uuid,
    pub business_name: String,
    pub recovered: usize,
    pub revenue_saved: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub reports_generated: usize,
    pub details: Vec<ReportEntry>,
}

/// Weekly owner-facing rollup: recovered appointments and protected revenue
/// per business over the trailing week. Businesses with nothing recovered
/// are left out of the details. The summary is emitted through structured
/// logs; there is no separate mail channel.
pub async fn run(
    repo: Arc<dyn Repository>,
    average_visit_value: Decimal,
    now: DateTime<Utc>,
) -> Result<ReportSummary> {
    let since = now - chrono::Duration::days(REPORT_WINDOW_DAYS);
    let businesses = repo.list_businesses().await?;

    let mut details = Vec::new();
    for business in businesses {
        let appointments = repo.appointments_started_since(business.id, since).await?;
        let recovered = recovered_count(&appointments);
        if recovered == 0 {
            continue;
        }

        let revenue_saved = Decimal::from(recovered as u64) * average_visit_value;
        info!(
            business = %business.name,
            owner = %business.owner_id,
            recovered,
            revenue_saved = %revenue_saved,
            "weekly revenue-protection report"
        );

        details.push(ReportEntry {
            business_id: business.id,
            business_name: business.name,
            recovered,
            revenue_saved,
        });
    }

    Ok(ReportSummary {
        reports_generated: details.len(),
        details,
    })
}
