use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::env;

use crate::gateway::whatsapp::WhatsAppCredentials;
use crate::jobs::{ReminderPolicy, WinbackPolicy};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub db_max_connections: u32,
    /// Public base URL used in reminder, review and referral links.
    pub app_url: String,
    /// Bearer token expected on the /internal/cron trigger endpoints.
    pub cron_secret: String,
    /// Absent means no messages can be sent; job runs fail fast.
    pub whatsapp: Option<WhatsAppCredentials>,
    pub reminder_lead_hours: i64,
    pub reminder_window_minutes: i64,
    pub winback_lapse_days: i64,
    pub winback_cooldown_days: i64,
    /// Stand-in per-visit value for the revenue-saved rollups; not derived
    /// from real pricing data.
    pub average_visit_value: Decimal,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let whatsapp = match (
            env::var("WHATSAPP_ACCESS_TOKEN").ok(),
            env::var("WHATSAPP_PHONE_NUMBER_ID").ok(),
        ) {
            (Some(access_token), Some(phone_number_id)) => Some(WhatsAppCredentials {
                access_token,
                phone_number_id,
            }),
            (None, None) => None,
            _ => bail!(
                "WHATSAPP_ACCESS_TOKEN and WHATSAPP_PHONE_NUMBER_ID must be set together"
            ),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL required")?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()?,
            app_url: env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            cron_secret: env::var("CRON_SECRET").context("CRON_SECRET required")?,
            whatsapp,
            reminder_lead_hours: env::var("REMINDER_LEAD_HOURS")
                .unwrap_or_else(|_| "24".into())
                .parse()?,
            reminder_window_minutes: env::var("REMINDER_WINDOW_MINUTES")
                .unwrap_or_else(|_| "60".into())
                .parse()?,
            winback_lapse_days: env::var("WINBACK_LAPSE_DAYS")
                .unwrap_or_else(|_| "60".into())
                .parse()?,
            winback_cooldown_days: env::var("WINBACK_COOLDOWN_DAYS")
                .unwrap_or_else(|_| "30".into())
                .parse()?,
            average_visit_value: env::var("AVERAGE_VISIT_VALUE")
                .unwrap_or_else(|_| "1000".into())
                .parse()?,
            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
        })
    }

    pub fn reminder_policy(&self) -> ReminderPolicy {
        ReminderPolicy {
            lead: chrono::Duration::hours(self.reminder_lead_hours),
            window: chrono::Duration::minutes(self.reminder_window_minutes),
        }
    }

    pub fn winback_policy(&self) -> WinbackPolicy {
        WinbackPolicy {
            lapse: chrono::Duration::days(self.winback_lapse_days),
            cooldown: chrono::Duration::days(self.winback_cooldown_days),
        }
    }
}
