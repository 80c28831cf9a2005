use anyhow::{Context, Result};
use clap::Parser;
use interview_room::{create_router, AppState, BackendClient, Config, InterviewRoom, NatsTransport};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "interview-room")]
#[command(about = "Run a live mock interview room behind a local control API")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/interview-room")]
    config: String,

    /// Override the HTTP port from the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config).context("Failed to load config")?;

    info!("Interview Room v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Backend: {}", cfg.backend.base_url);
    info!("Transport: {}", cfg.transport.nats_url);

    let backend = BackendClient::new(&cfg.backend).context("Failed to create backend client")?;
    let transport = Arc::new(NatsTransport::new(cfg.transport.nats_url.clone()));
    let room = Arc::new(InterviewRoom::with_backend(
        transport,
        backend,
        cfg.participant.clone(),
    ));

    let app = create_router(AppState::new(Arc::clone(&room)));

    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Control API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Never leave a live connection behind
    room.close().await;

    info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
