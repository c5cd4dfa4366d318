//! CLI administration tool for linkgate.
//!
//! # Usage
//!
//! ```bash
//! # Show the effective admission policies
//! cargo run --bin admin -- limits
//!
//! # Is a slug taken?
//! cargo run --bin admin -- slug check promo
//!
//! # Which slug would a request for "promo" end up with?
//! cargo run --bin admin -- slug suggest promo
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required for `slug` and `db`)
//! - `RATE_LIMIT_*`, `MAX_SLUG_PROBES`: same as the server

use linkgate::application::services::SlugAllocator;
use linkgate::config::Config;
use linkgate::domain::entities::SlugAvailability;
use linkgate::infrastructure::persistence::PgSlugRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkgate.
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
    /// Show the effective rate limit policies
    Limits,

    /// Inspect slug availability
    Slug {
        #[command(subcommand)]
        action: SlugAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Slug subcommands.
#[derive(Subcommand)]
enum SlugAction {
    /// Check whether a slug is taken
    Check { slug: String },

    /// Show the slug a request for BASE would be given
    Suggest { base: String },
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
    let config = Config::from_env()?;

    match cli.command {
        Commands::Limits => print_limits(&config),
        Commands::Slug { action } => {
            let pool = connect(&config).await?;
            handle_slug_action(action, pool, config.max_slug_probes).await?;
        }
        Commands::Db { action } => {
            let pool = connect(&config).await?;
            handle_db_action(action, &pool).await?;
        }
    }

    Ok(())
}

async fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;

    PgPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Prints the policy table the server would use with the current environment.
fn print_limits(config: &Config) {
    println!("{}", "Rate limits".bright_blue().bold());
    println!();
    println!(
        "  {:<14} {:>6} {:>10}",
        "Route".bright_white().bold(),
        "Limit".bright_white().bold(),
        "Window".bright_white().bold()
    );
    println!("  {}", "-".repeat(32).bright_black());

    for (route, policy) in config.rate_limits.named() {
        println!(
            "  {:<14} {:>6} {:>9}s",
            route.cyan(),
            policy.limit,
            policy.window.as_secs()
        );
    }

    let default = config.rate_limits.default_policy();
    println!(
        "  {:<14} {:>6} {:>9}s",
        "(default)".bright_black(),
        default.limit,
        default.window.as_secs()
    );
    println!();
}

/// Dispatches slug commands against the database.
async fn handle_slug_action(action: SlugAction, pool: PgPool, max_probes: usize) -> Result<()> {
    let repo = Arc::new(PgSlugRepository::new(Arc::new(pool)));
    let allocator = SlugAllocator::with_max_probes(repo, max_probes);

    match action {
        SlugAction::Check { slug } => {
            let availability = allocator
                .check(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

            match availability {
                SlugAvailability::Available => {
                    println!("  {} {}", slug.cyan(), "is available".green().bold())
                }
                SlugAvailability::Taken => {
                    println!("  {} {}", slug.cyan(), "is taken".red().bold())
                }
            }
        }
        SlugAction::Suggest { base } => {
            let slug = allocator
                .generate_unique_slug(&base)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to derive slug: {}", e))?;

            if slug == base {
                println!("  {} {}", slug.cyan(), "is free as requested".green());
            } else {
                println!(
                    "  {} is taken, next free: {}",
                    base.cyan(),
                    slug.bright_yellow().bold()
                );
            }
        }
    }

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
            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Links:      {}", links.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
