mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{appointment, business, customer, job};

#[derive(Parser)]
#[command(name = "rebook")]
#[command(about = "ReBook CLI - Interact with the ReBook engagement service")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "API server URL")]
    server: Option<String>,

    #[arg(long, global = true, help = "Output format", default_value = "table")]
    format: output::Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure CLI settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage businesses
    Business {
        #[command(subcommand)]
        command: business::Commands,
    },
    /// Manage customers
    Customer {
        #[command(subcommand)]
        command: customer::Commands,
    },
    /// Manage appointments
    #[command(alias = "apt")]
    Appointment {
        #[command(subcommand)]
        command: appointment::Commands,
    },
    /// Trigger the dispatch jobs
    Job {
        #[command(subcommand)]
        command: job::Commands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration values
    Set {
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        cron_secret: Option<String>,
    },
    /// Show current configuration
    Show,
    /// Get config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::Config::load()?;

    if let Some(server) = &cli.server {
        cfg.server = server.clone();
    }

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Set {
                server,
                cron_secret,
            } => {
                if let Some(s) = server {
                    cfg.server = s;
                }
                if let Some(secret) = cron_secret {
                    cfg.cron_secret = Some(secret);
                }
                cfg.save()?;
                println!("Configuration saved");
            }
            ConfigCommands::Show => {
                println!("Server: {}", cfg.server);
                println!(
                    "Cron secret: {}",
                    if cfg.cron_secret.is_some() {
                        "(set)"
                    } else {
                        "(not set)"
                    }
                );
            }
            ConfigCommands::Path => {
                println!("{}", config::config_path()?.display());
            }
        },
        Commands::Business { command } => {
            business::run(command, &cfg, cli.format).await?;
        }
        Commands::Customer { command } => {
            customer::run(command, &cfg, cli.format).await?;
        }
        Commands::Appointment { command } => {
            appointment::run(command, &cfg, cli.format).await?;
        }
        Commands::Job { command } => {
            job::run(command, &cfg, cli.format).await?;
        }
    }

    Ok(())
}
