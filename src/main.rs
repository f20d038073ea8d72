//! BenefiCh dispatcher
//!
//! Delivers scheduled notifications (email, mobile push) and social
//! sharings (Twitter, Instagram) for events, news and benefits once they
//! become due.

use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use benefich_core::config::AppConfig;
use benefich_core::error::AppError;
use benefich_core::traits::TracingReporter;
use benefich_core::types::ContentId;
use benefich_database::repositories::{
    ContentRepository, NotificationRepository, SharingRepository, UserRepository,
};
use benefich_database::{ContentStore, DatabasePool};
use benefich_entity::ContentKind;
use benefich_worker::{DispatchEngine, DispatchScheduler, Stores};

mod senders;

/// Scheduled notification and publication dispatcher.
#[derive(Debug, Parser)]
#[command(name = "benefich", version, about)]
struct Cli {
    /// Configuration overlay to load from `config/<env>.toml`
    /// (defaults to `$BENEFICH_ENV`, then `development`)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run dispatch passes on the configured cron schedule until stopped
    Serve,
    /// Run a single dispatch pass and exit
    Dispatch,
    /// Print the publication label of a content item
    Status {
        /// Content kind: event, new or benefit
        kind: ContentKind,
        /// Content id
        id: ContentId,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(cli.env.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, cli.command.unwrap_or(Command::Serve)).await {
        tracing::error!(error = %e, "Dispatcher error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the environment overlay and `BENEFICH__*`
/// variables.
fn load_configuration(env: Option<&str>) -> Result<AppConfig, AppError> {
    let env = env
        .map(str::to_string)
        .or_else(|| std::env::var("BENEFICH_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig, command: Command) -> Result<(), AppError> {
    tracing::info!("Starting BenefiCh dispatcher v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    if config.database.apply_schema {
        benefich_database::schema::apply_schema(db.pool()).await?;
    }

    let result = match command {
        Command::Serve => serve(&config, &db).await,
        Command::Dispatch => dispatch_once(&config, &db).await,
        Command::Status { kind, id } => print_status(&db, kind, id).await,
    };

    db.close().await;
    result
}

fn stores(db: &DatabasePool) -> Stores {
    let pool = db.pool().clone();
    Stores {
        contents: Arc::new(ContentRepository::new(pool.clone())),
        notifications: Arc::new(NotificationRepository::new(pool.clone())),
        sharings: Arc::new(SharingRepository::new(pool.clone())),
        recipients: Arc::new(UserRepository::new(pool)),
    }
}

fn engine(config: &AppConfig, db: &DatabasePool) -> Result<Arc<DispatchEngine>, AppError> {
    let senders = senders::build(config)?;
    Ok(Arc::new(DispatchEngine::new(
        stores(db),
        senders,
        Arc::new(TracingReporter),
    )))
}

async fn serve(config: &AppConfig, db: &DatabasePool) -> Result<(), AppError> {
    let engine = engine(config, db)?;

    if !config.dispatch.enabled {
        tracing::warn!("Dispatch is disabled; waiting for shutdown signal");
        shutdown_signal().await;
        return Ok(());
    }

    if config.dispatch.run_on_start {
        let pass = engine.run_pass().await;
        tracing::info!(
            delivered = pass.totals.delivered,
            failed = pass.totals.failed,
            store_errors = pass.store_errors,
            "Startup pass finished"
        );
    }

    let mut scheduler = DispatchScheduler::new().await?;
    scheduler
        .register(Arc::clone(&engine), &config.dispatch.schedule)
        .await?;
    scheduler.start().await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping scheduler...");
    scheduler.shutdown().await?;

    tracing::info!("BenefiCh dispatcher shut down gracefully");
    Ok(())
}

async fn dispatch_once(config: &AppConfig, db: &DatabasePool) -> Result<(), AppError> {
    let engine = engine(config, db)?;
    let pass = engine.run_pass().await;

    println!(
        "due={} delivered={} failed={} unconfirmed={} store_errors={}",
        pass.totals.due,
        pass.totals.delivered,
        pass.totals.failed,
        pass.totals.unconfirmed,
        pass.store_errors
    );

    if pass.store_errors > 0 {
        return Err(AppError::database(format!(
            "{} dispatch pair(s) failed on a store error",
            pass.store_errors
        )));
    }
    Ok(())
}

async fn print_status(db: &DatabasePool, kind: ContentKind, id: ContentId) -> Result<(), AppError> {
    let contents = ContentRepository::new(db.pool().clone());
    let content = contents
        .find_content(kind, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} {} not found", kind, id)))?;
    let summary = contents.delivery_summary(id).await?;

    let label = summary.label(content.publication_state(Utc::now()), content.pinned);
    println!("{} #{} {}: {}", kind, id, content.title, label);
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
