use sqlx::Row;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use dept_tracker::approval::{ApprovalPoller, ApprovalState, HttpStatusSource, DEFAULT_POLL_INTERVAL};

#[derive(Parser, Debug)]
#[command(author, version, about = "dept-tracker maintenance tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new empty migration with the provided name
    MakeMigration { name: String },
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Poll a running server until the signed-in account is approved
    WaitForApproval {
        #[arg(long, default_value = "http://localhost:8000")]
        server_url: String,
        /// Bearer token of the account; falls back to DEPT_TRACKER_TOKEN
        #[arg(long, env = "DEPT_TRACKER_TOKEN")]
        token: String,
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
        interval_secs: u64,
        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::MakeMigration { name } => {
            let path = make_migration_file(&name)?;
            println!("Created migration: {}", path.display());
        }
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            migrator.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            print_status(&pool, &migrator).await?;
        }
        Commands::WaitForApproval {
            server_url,
            token,
            interval_secs,
            timeout_secs,
        } => {
            wait_for_approval(&server_url, token, Duration::from_secs(interval_secs.max(1)), timeout_secs).await?;
        }
    }

    Ok(())
}

async fn wait_for_approval(
    server_url: &str,
    token: String,
    interval: Duration,
    timeout_secs: Option<u64>,
) -> anyhow::Result<()> {
    let source = HttpStatusSource::new(server_url, token)?;
    println!("Polling {} every {}s", source.url(), interval.as_secs());

    let mut poller = ApprovalPoller::start(Arc::new(source), interval);
    let mut updates = poller.subscribe();

    let watch_transitions = async move {
        let mut last = None;
        while updates.changed().await.is_ok() {
            let machine = updates.borrow_and_update().clone();
            if last == Some(machine.state()) {
                continue;
            }
            last = Some(machine.state());
            match machine.state() {
                ApprovalState::Checking => println!("checking..."),
                ApprovalState::PendingApproval => match machine.last_error() {
                    Some(err) => println!("pending approval (last check failed: {err})"),
                    None => println!("pending approval"),
                },
                ApprovalState::Approved | ApprovalState::Unauthenticated => break,
            }
        }
    };

    let outcome = async {
        tokio::join!(watch_transitions, poller.wait_until_approved()).1
    };

    let status = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), outcome)
            .await
            .ok()
            .flatten(),
        None => outcome.await,
    };
    poller.stop().await;

    match status {
        Some(status) => {
            println!(
                "Approved: department={} role={}",
                status.department_name.as_deref().unwrap_or("-"),
                status.role.as_deref().unwrap_or("-"),
            );
            Ok(())
        }
        None => anyhow::bail!("account was not approved (session ended or timed out)"),
    }
}

fn make_migration_file(name: &str) -> anyhow::Result<PathBuf> {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let sanitized = sanitize_name(name);
    let filename = format!("{}_{}.sql", timestamp, sanitized);
    let path = Path::new("migrations").join(filename);

    if path.exists() {
        anyhow::bail!("migration already exists: {}", path.display());
    }

    fs::write(&path, "-- Write your migration SQL here\n")
        .with_context(|| format!("failed to create migration at {}", path.display()))?;

    Ok(path)
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to database")
}

async fn print_status(pool: &SqlitePool, migrator: &sqlx::migrate::Migrator) -> anyhow::Result<()> {
    let has_table = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'")
        .fetch_optional(pool)
        .await?;
    let applied_versions: HashSet<i64> = if has_table.is_some() {
        let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
        rows.iter().filter_map(|row| row.try_get::<i64, _>("version").ok()).collect()
    } else {
        HashSet::new()
    };

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in migrator.iter() {
        let version = migration.version;
        let status = if applied_versions.contains(&version) { "applied" } else { "pending" };
        let desc = migration.description.as_ref().trim();
        let name = if desc.is_empty() { "unknown" } else { desc };
        println!("{:<8} {:<20} {}", status, version, name);
    }

    Ok(())
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}

async fn get_migrator() -> anyhow::Result<sqlx::migrate::Migrator> {
    // Containers may run from a different CWD; fall back to the crate-local folder.
    let local = Path::new("./migrations");
    let migrator_path = if local.exists() {
        local.to_path_buf()
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    };

    let migrator_path_display = migrator_path.display().to_string();
    sqlx::migrate::Migrator::new(migrator_path)
        .await
        .with_context(|| format!("failed to load migrations from {}", migrator_path_display))
}
