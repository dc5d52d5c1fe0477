use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Subcommand)]
pub enum Commands {
    /// Book a confirmed appointment
    Book {
        #[arg(long)]
        business_id: Uuid,
        #[arg(long)]
        customer_id: Uuid,
        #[arg(long, help = "RFC 3339 start time, e.g. 2026-08-07T15:30:00Z")]
        start_time: DateTime<Utc>,
    },
    /// Get appointment details
    Get {
        #[arg(help = "Appointment ID")]
        id: Uuid,
    },
    /// Mark the visit as completed
    Complete {
        #[arg(help = "Appointment ID")]
        id: Uuid,
    },
    /// Cancel the appointment
    Cancel {
        #[arg(help = "Appointment ID")]
        id: Uuid,
    },
    /// Mark the customer as a no-show
    Noshow {
        #[arg(help = "Appointment ID")]
        id: Uuid,
    },
    /// Move a confirmed appointment to a new time
    Reschedule {
        #[arg(help = "Appointment ID")]
        id: Uuid,
        #[arg(long, help = "RFC 3339 start time")]
        new_time: DateTime<Utc>,
    },
}

#[derive(Debug, Serialize)]
struct BookRequest {
    business_id: Uuid,
    customer_id: Uuid,
    start_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct RescheduleRequest {
    new_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[tabled(display_with = "display_time")]
    pub start_time: DateTime<Utc>,
    pub status: String,
    pub reminder_sent: bool,
}

fn display_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::Book {
            business_id,
            customer_id,
            start_time,
        } => {
            let req = BookRequest {
                business_id,
                customer_id,
                start_time,
            };
            let appointment: Appointment = client.post("/v1/appointments", &req).await?;
            output::print_created(appointment, format);
        }
        Commands::Get { id } => {
            let appointment: Appointment = client.get(&format!("/v1/appointments/{}", id)).await?;
            output::print_item(appointment, format);
        }
        Commands::Complete { id } => {
            let appointment: Appointment = client
                .post_empty(&format!("/v1/appointments/{}/complete", id))
                .await?;
            output::print_item(appointment, format);
        }
        Commands::Cancel { id } => {
            let appointment: Appointment = client
                .post_empty(&format!("/v1/appointments/{}/cancel", id))
                .await?;
            output::print_item(appointment, format);
        }
        Commands::Noshow { id } => {
            let appointment: Appointment = client
                .post_empty(&format!("/v1/appointments/{}/noshow", id))
                .await?;
            output::print_item(appointment, format);
        }
        Commands::Reschedule { id, new_time } => {
            let req = RescheduleRequest { new_time };
            let appointment: Appointment = client
                .post(&format!("/v1/appointments/{}/reschedule", id), &req)
                .await?;
            output::print_item(appointment, format);
        }
    }

    Ok(())
}
