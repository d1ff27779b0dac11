use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use cardrelay_delivery::{AckRegistry, DeliveryLauncher, DeliveryWorker, WebhookExecutor};
use cardrelay_issuer::IssuerClient;
use cardrelay_server::api::AppState;
use cardrelay_server::config::CardRelayConfig;
use cardrelay_server::error::ServerError;

/// cardrelay HTTP server.
#[derive(Parser, Debug)]
#[command(
    name = "cardrelay-server",
    about = "Virtual card proxy with acknowledged webhook delivery"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "cardrelay.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let mut config = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        CardRelayConfig::from_toml(&contents)?
    } else {
        info!(path = %cli.config, "config file not found, using defaults");
        CardRelayConfig::default()
    };
    config.apply_env();

    let policy = config.delivery.retry_policy();
    info!(
        max_attempts = policy.max_attempts,
        ack_timeout_ms = u64::try_from(policy.ack_timeout.as_millis()).unwrap_or(u64::MAX),
        backoff_base_ms = u64::try_from(policy.backoff_base.as_millis()).unwrap_or(u64::MAX),
        network_timeout_ms = u64::try_from(policy.network_timeout.as_millis()).unwrap_or(u64::MAX),
        "delivery policy resolved"
    );

    let webhook_url = config
        .delivery
        .webhook_url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            ServerError::Config("delivery.webhook_url (or WEBHOOK_URL) must be set".into())
        })?;
    let executor = Arc::new(WebhookExecutor::new(webhook_url)?);

    let registry = Arc::new(AckRegistry::new());
    let worker = DeliveryWorker::new(Arc::clone(&registry), executor, policy);
    let launcher = DeliveryLauncher::new(Arc::new(worker))
        .with_max_in_flight(config.delivery.max_in_flight());

    let issuer = IssuerClient::new(config.issuer.to_issuer_config())?;
    if issuer.is_test_mode() {
        warn!("issuer test mode is enabled, no real cards will be issued");
    }

    let auth_token: Option<Arc<str>> = config.auth.token().map(Arc::from);
    if auth_token.is_none() {
        warn!("no auth token configured, inbound requests are not authenticated");
    }

    let state = AppState {
        registry,
        launcher,
        issuer: Arc::new(issuer),
        auth_token,
    };
    let app = cardrelay_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "cardrelay-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM. Deliveries still in
    // flight are abandoned when the runtime stops.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("cardrelay-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
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
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
