//! CLI administration tool for linkgate.
//!
//! Provides maintenance commands for links, refresh token revocations and
//! database diagnostics without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Deactivate a link
//! cargo run --bin admin -- links deactivate aZ3kT9Lm
//!
//! # Delete links that have been inactive for 90 days
//! cargo run --bin admin -- links cleanup --days 90
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Drop revocation rows for tokens that already expired
//! cargo run --bin admin -- tokens purge
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use linkgate::config::{Config, mask_connection_string};
use linkgate::domain::repositories::{LinkRepository, RevocationRepository};
use linkgate::infrastructure::persistence::{PgLinkRepository, PgRevocationRepository};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
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
    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Manage refresh token revocations
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Deactivate a link by short code
    Deactivate {
        /// Short code to deactivate
        code: String,
    },

    /// Delete links that have been inactive for a while
    Cleanup {
        /// Minimum age in days of the inactive links to delete
        #[arg(short, long, default_value_t = 30)]
        days: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Revocation list subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Delete revocation rows whose token has expired
    Purge,
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

    let database_url = Config::load_database_url()?;

    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database at {}",
                mask_connection_string(&database_url)
            )
        })?;

    match cli.command {
        Commands::Links { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Tokens { action } => handle_token_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    match action {
        LinkAction::Deactivate { code } => {
            let repo = PgLinkRepository::new(Arc::new(pool.clone()));
            deactivate_link(&repo, &code).await?;
        }
        LinkAction::Cleanup { days, yes } => {
            cleanup_links(pool, days, yes).await?;
        }
    }

    Ok(())
}

async fn deactivate_link(repo: &PgLinkRepository, code: &str) -> Result<()> {
    println!("{}", "🔒 Deactivate Link".bright_blue().bold());
    println!();

    let link = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    if !link.is_active {
        println!("{}", "⚠️  This link is already inactive".yellow());
        return Ok(());
    }

    println!("  Code:   {}", link.short_code.cyan());
    println!("  URL:    {}", link.original_url.bright_white());
    println!("  Owner:  {}", link.owner_id.to_string().bright_black());
    println!("  Clicks: {}", link.clicks.to_string().bright_black());
    println!();

    repo.deactivate(code, None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deactivate link: {}", e))?;

    println!("{}", "✅ Link deactivated".green().bold());
    println!();

    Ok(())
}

/// Deletes inactive links older than `days`.
///
/// # Safety
///
/// - Only rows with `is_active = FALSE` are touched
/// - Requires confirmation (default: No) unless `--yes`
async fn cleanup_links(pool: &PgPool, days: i64, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Clean Up Inactive Links".bright_blue().bold());
    println!();

    anyhow::ensure!(days >= 0, "--days must not be negative");

    let cutoff = Utc::now() - chrono::Duration::days(days);

    let candidates: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM links WHERE is_active = FALSE AND updated_at < $1",
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;

    if candidates == 0 {
        println!(
            "{}",
            format!("  No links inactive for more than {days} days").yellow()
        );
        return Ok(());
    }

    println!(
        "  {} inactive links older than {} days",
        candidates.to_string().bright_white().bold(),
        days
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these links permanently?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = sqlx::query("DELETE FROM links WHERE is_active = FALSE AND updated_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();

    println!();
    println!(
        "{}",
        format!("✅ Deleted {deleted} links").green().bold()
    );
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Links and users, in total and created today
/// - Total number of clicks
/// - Top 5 links by clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let links_today: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE created_at >= date_trunc('day', NOW())")
            .fetch_one(pool)
            .await?;

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let users_today: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= date_trunc('day', NOW())")
            .fetch_one(pool)
            .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM links")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:  {} ({} today)",
        links_count.to_string().bright_green().bold(),
        links_today.to_string().bright_green()
    );
    println!(
        "  Users:  {} ({} today)",
        users_count.to_string().bright_green().bold(),
        users_today.to_string().bright_green()
    );
    println!(
        "  Clicks: {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    let top: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT short_code, original_url, clicks FROM links ORDER BY clicks DESC, id ASC LIMIT 5",
    )
    .fetch_all(pool)
    .await?;

    if top.is_empty() {
        return Ok(());
    }

    println!("{}", "Top links:".bright_white().bold());
    println!(
        "  {:<12} {:<8} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for (code, url, clicks) in &top {
        println!(
            "  {:<12} {:<8} {}",
            code.cyan(),
            clicks.to_string().bright_green(),
            url.bright_black()
        );
    }
    println!();

    Ok(())
}

/// Handles revocation list maintenance.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    match action {
        TokenAction::Purge => {
            println!("{}", "🗑️  Purge Expired Revocations".bright_blue().bold());

            let repo = PgRevocationRepository::new(Arc::new(pool.clone()));
            let purged = repo
                .purge_expired(Utc::now())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to purge revocations: {}", e))?;

            println!(
                "{}",
                format!("✅ Removed {purged} expired entries").green().bold()
            );
        }
    }

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

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
