use clap::{Parser, Subcommand};
use folio::{AppState, router};
use folio_config::Config;
use folio_db::{Database, Repository};
use folio_library::{BroadcastNotifier, Coordinator, CoverCache};
use folio_render::ImageRenderer;
use folio_storage::backend::LocalBackend;
use miette::{IntoDiagnostic, Result, miette};
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Library item catalog server.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, short, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the resolved configuration and check it.
    CheckConfig,
}

/// Flatten an error tree into a diagnostic, keeping the whole tree.
fn report(err: impl Debug) -> miette::Report {
    miette!("{err:?}")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).map_err(report)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
                config.validate().map_err(report)?;
            }
            serve(config).await
        },
        Command::CheckConfig => {
            println!("{}", serde_json::to_string_pretty(&config.redacted()).into_diagnostic()?);
            println!("configuration is valid");
            Ok(())
        },
    }
}

async fn serve(config: Config) -> Result<()> {
    if let Some(parent) = config.database.path.parent() {
        tokio::fs::create_dir_all(parent).await.into_diagnostic()?;
    }
    let db = Database::connect(&config.database.path).await.map_err(report)?;
    let store = Arc::new(Repository::from(&db));
    let sources = Arc::new(LocalBackend::new("covers", &config.covers.source_root).map_err(report)?);
    let cache = Arc::new(LocalBackend::new("cover-cache", &config.covers.cache_root).map_err(report)?);
    let coordinator = Coordinator::new(
        store,
        Arc::new(CoverCache::new(cache)),
        sources,
        Arc::new(ImageRenderer::default().with_max_dimension(config.covers.max_dimension)),
        Arc::new(BroadcastNotifier::default()),
    );
    let state = AppState::from_config(Arc::new(coordinator), &config.users)
        .with_max_cover_dimension(config.covers.max_dimension);
    if config.users.is_empty() {
        tracing::warn!("no users configured, every request will be rejected");
    }

    let addr = config.server.socket_addr().map_err(report)?;
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    tracing::info!(%addr, database = %config.database.path.display(), "serving");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
