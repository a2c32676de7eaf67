//! llmsvc-gateway - multi-tenant text-inference gateway
//!
//! Serves summarization, sentiment, entity extraction, paraphrase, keyword
//! extraction and embeddings over HTTP, with per-client adaptive admission
//! control in front of every task.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use llmsvc_common::config::{BackendKind, TomlConfig};
use llmsvc_gateway::capabilities::builtin::BuiltinFactory;
use llmsvc_gateway::capabilities::remote::{RemoteBackend, RemoteFactory};
use llmsvc_gateway::capabilities::CapabilityFactory;
use llmsvc_gateway::config::{ConfigOverrides, GatewaySettings};
use llmsvc_gateway::services::spawn_idle_sweeper;
use llmsvc_gateway::{build_router, AppState};

/// Command-line arguments for llmsvc-gateway
#[derive(Parser, Debug)]
#[command(name = "llmsvc-gateway")]
#[command(about = "Multi-tenant text-inference gateway")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "LLMSVC_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LLMSVC_PORT")]
    port: Option<u16>,

    /// Value required in the Authorization header (empty disables auth)
    #[arg(long, env = "LLMSVC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    #[arg(long)]
    embedding_model: Option<String>,

    #[arg(long)]
    summarization_model: Option<String>,

    #[arg(long)]
    sentiment_model: Option<String>,

    #[arg(long)]
    ner_model: Option<String>,

    #[arg(long)]
    paraphrase_model: Option<String>,

    #[arg(long)]
    keyword_model: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            api_key: self.api_key.clone(),
            log_level: self.log_level.clone(),
            embedding_model: self.embedding_model.clone(),
            summarization_model: self.summarization_model.clone(),
            sentiment_model: self.sentiment_model.clone(),
            ner_model: self.ner_model.clone(),
            paraphrase_model: self.paraphrase_model.clone(),
            keyword_model: self.keyword_model.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read first so its log level can seed the filter; the source
    // is reported once the subscriber is up
    let (toml_config, source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("llmsvc_gateway={level},tower_http=info").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting llmsvc-gateway v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    match &source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => warn!("No configuration file found, using compiled defaults"),
    }

    let settings = GatewaySettings::resolve(toml_config, source, args.overrides())
        .context("Invalid configuration")?;
    let factory = capability_factory(&settings)?;
    let state = AppState::new(settings, factory);

    // Required capabilities must load before accepting traffic
    state
        .gateway
        .prewarm()
        .await
        .context("Failed to load required capabilities")?;

    let cancel = CancellationToken::new();
    let throttle = &state.settings.config.throttle;
    let sweeper = (throttle.idle_eviction_secs > 0).then(|| {
        spawn_idle_sweeper(
            Arc::clone(state.gateway.admission()),
            Duration::from_secs(throttle.sweep_interval_secs.max(1)),
            Duration::from_secs(throttle.idle_eviction_secs),
            cancel.clone(),
        )
    });

    let addr = state.settings.bind_addr();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel.cancel();
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }

    info!("Server shutdown complete");
    Ok(())
}

fn capability_factory(settings: &GatewaySettings) -> Result<Arc<dyn CapabilityFactory>> {
    let backend = &settings.config.backend;
    match backend.kind {
        BackendKind::Builtin => {
            info!("Inference backend: builtin");
            Ok(Arc::new(BuiltinFactory))
        }
        BackendKind::Remote => {
            info!("Inference backend: remote at {}", backend.endpoint);
            let remote = RemoteBackend::new(&backend.endpoint, Duration::from_secs(backend.timeout_secs))
                .context("Failed to create inference client")?;
            Ok(Arc::new(RemoteFactory::new(remote)))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
