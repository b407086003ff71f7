//! CLI administration tool for the shortener.
//!
//! Provides maintenance and inspection commands that work directly against
//! the database, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Delete expired links (and their cache entries)
//! cargo run --bin admin -- purge
//!
//! # Show click analytics for a code
//! cargo run --bin admin -- analytics 8m0Kx
//!
//! # Convert between ids and generated codes
//! cargo run --bin admin -- encode 123456789
//! cargo run --bin admin -- decode 8m0Kx
//!
//! # Overall statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `shortener::config`); `DATABASE_URL` is required
//! for every command except `encode` and `decode`.

use shortener::config;
use shortener::domain::expiry_sweeper::sweep_expired;
use shortener::domain::repositories::LinkRepository;
use shortener::infrastructure::persistence::PgLinkRepository;
use shortener::server::{connect_cache, connect_database};
use shortener::utils::base62;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete links whose expiry has passed
    Purge {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show click analytics for a short code
    Analytics {
        /// Short code or custom alias
        code: String,
    },

    /// Encode a numeric id as a short code
    Encode { id: u64 },

    /// Decode a generated short code back to its id
    Decode { code: String },

    /// Show link statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

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

    // Codec commands are offline.
    match cli.command {
        Commands::Encode { id } => return encode(id),
        Commands::Decode { ref code } => return decode(code),
        _ => {}
    }

    let config = config::load_from_env()?;
    let pool = connect_database(&config).await?;

    match cli.command {
        Commands::Purge { yes } => purge(&config, pool, yes).await?,
        Commands::Analytics { code } => analytics(pool, &code).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Encode { .. } | Commands::Decode { .. } => {}
    }

    Ok(())
}

fn encode(id: u64) -> Result<()> {
    println!("  {} → {}", id.to_string().bright_white(), base62::encode(id).bright_yellow().bold());
    Ok(())
}

fn decode(code: &str) -> Result<()> {
    let id = base62::decode(code).with_context(|| format!("'{code}' is not a generated code"))?;
    println!("  {} → {}", code.bright_yellow(), id.to_string().bright_white().bold());
    Ok(())
}

/// Purges expired links after showing how many are affected.
async fn purge(config: &config::Config, pool: PgPool, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Purge expired links".bright_blue().bold());
    println!();

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM urls WHERE expires_at IS NOT NULL AND expires_at <= $1",
    )
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    if pending == 0 {
        println!("{}", "  Nothing to purge".green());
        return Ok(());
    }

    println!("  Expired links: {}", pending.to_string().yellow().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete them permanently?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let repo = PgLinkRepository::new(Arc::new(pool));
    let cache = connect_cache(config).await;

    let purged = sweep_expired(&repo, cache.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to purge: {}", e))?;

    println!();
    println!(
        "{} {}",
        "✅ Purged".green().bold(),
        purged.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn analytics(pool: PgPool, code: &str) -> Result<()> {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let analytics = repo
        .read_analytics(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Short code '{code}' not found"))?;

    println!("{}", "📈 Link analytics".bright_blue().bold());
    println!();
    println!("  Code:          {}", analytics.code.cyan());
    println!(
        "  Clicks:        {}",
        analytics.click_count.to_string().bright_green().bold()
    );
    let last = analytics
        .last_accessed
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!("  Last accessed: {}", last.bright_black());
    println!();

    Ok(())
}

/// Displays link and click totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links, clicks, expired): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(click_count), 0)::BIGINT,
               COUNT(*) FILTER (WHERE expires_at IS NOT NULL AND expires_at <= NOW())
        FROM urls
        "#,
    )
    .fetch_one(pool)
    .await?;

    println!("  Links:         {}", links.to_string().bright_green().bold());
    println!("  Clicks:        {}", clicks.to_string().bright_green().bold());
    println!("  Expired:       {}", expired.to_string().yellow().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
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
