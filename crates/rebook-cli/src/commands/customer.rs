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
    /// Add a customer to a business
    Add {
        #[arg(long)]
        business_id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, help = "Exclude from win-back outreach")]
        no_marketing: bool,
    },
    /// List a business's customers
    List {
        #[arg(help = "Business ID")]
        business_id: Uuid,
    },
}

#[derive(Debug, Serialize)]
struct AddRequest {
    name: String,
    phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    marketing_opt_in: bool,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[tabled(display_with = "display_option")]
    pub email: Option<String>,
    pub marketing_opt_in: bool,
    #[tabled(display_with = "display_time")]
    pub last_visit_at: Option<DateTime<Utc>>,
}

fn display_option(o: &Option<String>) -> String {
    o.clone().unwrap_or_else(|| "-".into())
}

fn display_time(o: &Option<DateTime<Utc>>) -> String {
    o.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::Add {
            business_id,
            name,
            phone,
            email,
            no_marketing,
        } => {
            let req = AddRequest {
                name,
                phone,
                email,
                marketing_opt_in: !no_marketing,
            };
            let customer: Customer = client
                .post(&format!("/v1/businesses/{}/customers", business_id), &req)
                .await?;
            output::print_created(customer, format);
        }
        Commands::List { business_id } => {
            let customers: Vec<Customer> = client
                .get(&format!("/v1/businesses/{}/customers", business_id))
                .await?;
            output::print_items(customers, format);
        }
    }

    Ok(())
}
