use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use civitas_server::state::AppState;

/// `civitas health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$CIVITAS_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("CIVITAS_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("civitas=info".parse()?),
        )
        .json()
        .init();

    let cfg = civitas_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/civitas.db", cfg.data_dir);
    let db = civitas_duckdb::DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    info!(
        timezone = %cfg.timezone,
        default_period = %cfg.default_period,
        cache_ttl_secs = cfg.cache_ttl_secs,
        serve_stale = cfg.serve_stale,
        "Dashboard configuration loaded"
    );

    let state = Arc::new(AppState::new(db, cfg.clone()));
    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = civitas_server::app::build_app(state);

    info!(port = cfg.port, "Civitas analytics listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
