use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the appointment reminder dispatcher
    Reminders,
    /// Run the win-back dispatcher
    Winback,
    /// Run the weekly revenue-protection report
    WeeklyReport,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
pub struct ItemOutcome {
    pub id: Uuid,
    pub status: String,
    #[serde(default)]
    #[tabled(display_with = "display_option")]
    pub error: Option<String>,
    #[serde(default)]
    #[tabled(display_with = "display_option")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobSummary {
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub details: Vec<ItemOutcome>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
pub struct ReportEntry {
    pub business_id: Uuid,
    pub business_name: String,
    pub recovered: usize,
    pub revenue_saved: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportSummary {
    pub reports_generated: usize,
    pub details: Vec<ReportEntry>,
}

fn display_option(o: &Option<String>) -> String {
    o.clone().unwrap_or_else(|| "-".into())
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::Reminders => {
            let summary: JobSummary = client.post_trigger("/internal/cron/reminders").await?;
            print_job_summary(summary, format);
        }
        Commands::Winback => {
            let summary: JobSummary = client.post_trigger("/internal/cron/winback").await?;
            print_job_summary(summary, format);
        }
        Commands::WeeklyReport => {
            let summary: ReportSummary = client.post_trigger("/internal/cron/weekly-report").await?;
            match format {
                Format::Json => output::print_json(&summary),
                Format::Table => {
                    output::print_success(&format!(
                        "{} report(s) generated",
                        summary.reports_generated
                    ));
                    output::print_items(summary.details, format);
                }
            }
        }
    }

    Ok(())
}

fn print_job_summary(summary: JobSummary, format: Format) {
    match format {
        Format::Json => output::print_json(&summary),
        Format::Table => {
            output::print_success(&format!(
                "processed {} / sent {} / failed {} / skipped {}",
                summary.processed, summary.sent, summary.failed, summary.skipped
            ));
            output::print_items(summary.details, format);
        }
    }
}
