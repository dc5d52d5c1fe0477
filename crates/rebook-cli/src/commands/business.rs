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
    /// List all businesses
    List,
    /// Create a new business
    Create {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
        #[arg(long, help = "Public review destination URL")]
        review_link: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Get business details
    Get {
        #[arg(help = "Business ID")]
        id: Uuid,
    },
    /// Update name / review destination
    Settings {
        #[arg(help = "Business ID")]
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        review_link: Option<String>,
    },
    /// Show the 30-day engagement dashboard
    Metrics {
        #[arg(help = "Business ID")]
        id: Uuid,
    },
}

#[derive(Debug, Serialize)]
struct CreateRequest {
    owner_id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
}

#[derive(Debug, Serialize)]
struct SettingsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub owner_id: String,
    #[tabled(display_with = "display_option")]
    pub review_link: Option<String>,
    pub timezone: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Metrics {
    total_appointments: usize,
    no_shows: usize,
    recovered: usize,
    revenue_saved: Decimal,
    new_reviews: usize,
    lapsed_customers: u64,
    resurrected_this_month: u64,
}

fn display_option(o: &Option<String>) -> String {
    o.clone().unwrap_or_else(|| "-".into())
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::List => {
            let businesses: Vec<Business> = client.get("/v1/businesses").await?;
            output::print_items(businesses, format);
        }
        Commands::Create {
            owner,
            name,
            review_link,
            timezone,
        } => {
            let req = CreateRequest {
                owner_id: owner,
                name,
                review_link,
                timezone,
            };
            let business: Business = client.post("/v1/businesses", &req).await?;
            output::print_created(business, format);
        }
        Commands::Get { id } => {
            let business: Business = client.get(&format!("/v1/businesses/{}", id)).await?;
            output::print_item(business, format);
        }
        Commands::Settings {
            id,
            name,
            review_link,
        } => {
            let req = SettingsRequest { name, review_link };
            let business: Business = client
                .put(&format!("/v1/businesses/{}/settings", id), &req)
                .await?;
            output::print_item(business, format);
        }
        Commands::Metrics { id } => {
            let metrics: Metrics = client.get(&format!("/v1/businesses/{}/metrics", id)).await?;
            match format {
                Format::Json => output::print_json(&metrics),
                Format::Table => {
                    println!("Appointments (30d):   {}", metrics.total_appointments);
                    println!("No-shows:             {}", metrics.no_shows);
                    println!("Recovered:            {}", metrics.recovered);
                    println!("Revenue saved:        {}", metrics.revenue_saved);
                    println!("New reviews:          {}", metrics.new_reviews);
                    println!("Lapsed customers:     {}", metrics.lapsed_customers);
                    println!("Resurrected (30d):    {}", metrics.resurrected_this_month);
                }
            }
        }
    }

    Ok(())
}
