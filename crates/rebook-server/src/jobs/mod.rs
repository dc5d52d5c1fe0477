pub mod reminder;
pub mod weekly_report;
pub mod winback;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    /// Lead time between the run and the appointments it targets.
    pub lead: chrono::Duration,
    /// Tolerance window: appointments in `[now + lead, now + lead + window)`
    /// are eligible.
    pub window: chrono::Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinbackPolicy {
    /// Inactivity threshold before a customer counts as lapsed.
    pub lapse: chrono::Duration,
    /// Minimum spacing between two win-back contacts to the same customer.
    pub cooldown: chrono::Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Sent,
    Failed,
    Skipped,
}

/// Per-candidate result. Failures are collected here, never propagated; a
/// candidate that fails does not abort the rest of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub id: Uuid,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ItemOutcome {
    pub fn sent(id: Uuid) -> Self {
        Self {
            id,
            status: ItemStatus::Sent,
            error: None,
            reason: None,
        }
    }

    pub fn failed(id: Uuid, error: impl Into<String>) -> Self {
        Self {
            id,
            status: ItemStatus::Failed,
            error: Some(error.into()),
            reason: None,
        }
    }

    pub fn skipped(id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            id,
            status: ItemStatus::Skipped,
            error: None,
            reason: Some(reason.into()),
        }
    }
}

/// Structured summary returned by every dispatcher run, also when no
/// candidate matched.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub details: Vec<ItemOutcome>,
}

impl JobSummary {
    pub fn from_details(details: Vec<ItemOutcome>) -> Self {
        let count = |status: ItemStatus| details.iter().filter(|d| d.status == status).count();
        Self {
            processed: details.len(),
            sent: count(ItemStatus::Sent),
            failed: count(ItemStatus::Failed),
            skipped: count(ItemStatus::Skipped),
            details,
        }
    }
}
