//! CLI administration tool for shrtn.
//!
//! Runs maintenance tasks directly against the PostgreSQL store without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Remove expired mappings now
//! cargo run --bin admin -- sweep
//!
//! # Show a stored mapping
//! cargo run --bin admin -- lookup promo
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (`DATABASE_URL` or `DB_*`, `BASE_URL`, `RETENTION_DAYS`).
//! A database is required.

use shrtn::application::services::MappingService;
use shrtn::config::{self, Config};
use shrtn::infrastructure::persistence::PgMappingRepository;
use shrtn::server::connect_pool;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shrtn.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Delete every mapping past its expiry
    Sweep {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the mapping stored for a code
    Lookup {
        /// Short code
        code: String,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL (or DB_HOST/DB_USER/DB_PASSWORD/DB_NAME) must be set")?;

    let pool = connect_pool(&config, &database_url).await?;

    match cli.command {
        Commands::Sweep { yes } => sweep(&config, &pool, yes).await?,
        Commands::Lookup { code } => lookup(&config, &pool, &code).await?,
        Commands::Stats => handle_stats(&config, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn mapping_service(config: &Config, pool: &PgPool) -> MappingService {
    let repository = Arc::new(PgMappingRepository::new(Arc::new(pool.clone())));
    MappingService::new(repository, config.base_url.clone(), config.retention())
}

/// Runs one expiry sweep after confirmation.
async fn sweep(config: &Config, pool: &PgPool, skip_confirm: bool) -> Result<()> {
    println!("{}", "Sweep expired mappings".bright_blue().bold());
    println!();

    let service = mapping_service(config, pool);
    let now = Utc::now();

    let pending = service
        .count_expired(now)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to query expired mappings: {}", e))?;

    if pending == 0 {
        println!("{}", "  Nothing to sweep".yellow());
        return Ok(());
    }

    println!(
        "  Expired mappings: {}",
        pending.to_string().bright_white().bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete them?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let deleted = service
        .sweep_expired_before(now)
        .await
        .map_err(|e| anyhow::anyhow!("Sweep failed: {}", e))?;

    println!();
    println!(
        "{} {}",
        "Deleted mappings:".green().bold(),
        deleted.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Prints the mapping stored for `code`.
async fn lookup(config: &Config, pool: &PgPool, code: &str) -> Result<()> {
    let service = mapping_service(config, pool);

    let mapping = match service.resolve(code).await {
        Ok(mapping) => mapping,
        Err(shrtn::AppError::NotFound { .. }) => {
            println!("{} {}", "No mapping for code".yellow(), code.cyan());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Database error: {}", e)),
    };

    let status = if mapping.is_expired_at(Utc::now()) {
        "EXPIRED".red()
    } else {
        "LIVE".green()
    };

    println!("  Code:      {}", mapping.code.cyan());
    println!("  Long URL:  {}", mapping.long_url.bright_white());
    println!("  Short URL: {}", mapping.short_url.bright_white());
    println!(
        "  Posted:    {}",
        mapping
            .posted_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!(
        "  Expires:   {} {}",
        mapping
            .expires_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black(),
        status
    );

    Ok(())
}

/// Displays mapping counts.
async fn handle_stats(config: &Config, pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let service = mapping_service(config, pool);

    let total = service
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let expired = service
        .count_expired(Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!(
        "  Mappings:         {}",
        total.to_string().bright_green().bold()
    );
    println!(
        "  Awaiting sweep:   {}",
        expired.to_string().bright_yellow().bold()
    );
    println!(
        "  Retention:        {} days",
        config.retention_days.to_string().bright_white()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
