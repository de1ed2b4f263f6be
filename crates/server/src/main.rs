use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::get, Router};
use clap::{Parser, ValueEnum};
use storage::{DataStore, Storage};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod controllers;
mod mux;
mod request;
mod views;

#[cfg(test)]
#[path = "tests/fake_store.rs"]
mod test_support;

use app_state::AppState;
use config::{load_settings, prepare_database_url, Settings};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Serve the journal over HTTP.
    Run,
    /// Create the database file and schema, then exit.
    Create,
}

#[derive(Parser, Debug)]
#[command(name = "journal", version, about = "A small personal journal web app")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Mode::Run)]
    mode: Mode,
    /// Port to run the web server on.
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(port) = cli.port {
        settings = settings.with_port(port)?;
    }
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }

    info!(version = VERSION, mode = ?cli.mode, "journal starting");

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    if cli.mode == Mode::Create {
        storage.close().await;
        info!(%database_url, "database created");
        return Ok(());
    }

    let store: Arc<dyn DataStore> = Arc::new(storage);
    let app = build_router(build_state(store.clone(), &settings)?);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    store.close().await;
    Ok(())
}

fn build_state(store: Arc<dyn DataStore>, settings: &Settings) -> anyhow::Result<Arc<AppState>> {
    let mux = mux::journal_routes().map_err(|error| {
        error!(%error, code = ?error.code(), "route table is misconfigured");
        error
    })?;
    info!(routes = mux.len(), "routes registered");
    Ok(Arc::new(AppState {
        store,
        mux: Arc::new(mux),
        request_timeout: settings.request_timeout(),
        max_form_bytes: settings.max_form_bytes,
    }))
}

fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_form_bytes;
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(mux::dispatch)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            error!(%error, "store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
