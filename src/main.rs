use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use license_gate::license::{validator, LicenseState, MachineIdentity};
use license_gate::{api, authority, config::Config, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "license-gate starting");

    // Load configuration
    let config = Config::load()?;
    info!(
        authority = %config.authority.server_url,
        product_id = config.license.product_id,
        "Loaded configuration"
    );

    // Generate this instance's machine code (fresh per process, as floating
    // licensing expects for containers)
    let machine = MachineIdentity::generate();
    info!(machine = %machine, "Generated machine code");

    // Create the shared HTTP client for authority calls
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            config.authority.timeout_seconds,
        ))
        .build()?;

    let authority = authority::AuthorityClient::new(
        http_client,
        config.authority.server_url.clone(),
        authority::Credentials::from_config(&config),
    );

    // Create shared state
    let state = Arc::new(AppState {
        authority,
        config: config.clone(),
        license: LicenseState::new(),
        machine,
        validation_in_flight: std::sync::atomic::AtomicBool::new(false),
    });

    // Validate the license before serving anything; an instance that cannot
    // activate must not come up
    if let Err(e) = validator::check_once(&state).await {
        error!(error = %e, "Startup license validation failed, refusing to serve");
        return Err(e.into());
    }

    // Start the background re-validation task
    let validator_handle = validator::spawn(Arc::clone(&state));

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Listening on: {}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup: stop re-validation, then release the activation slot
    info!("Shutting down background tasks");
    validator_handle.abort();
    validator::deactivate_on_shutdown(&state).await;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
