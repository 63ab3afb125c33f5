use anyhow::Context;
use clap::Parser;
use s3relay_core::storage::{ObjectStore, S3Store};
use s3relay_core::{Config, PublicUrl};
use s3relay_server::{AppState, router};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Flags override the matching `S3RELAY_*` variables and are validated the same way.
#[derive(Parser)]
#[command(name = "s3relay-server", about = "HTTP relay that uploads files to S3-compatible storage")]
struct Cli {
    /// Address to bind to (overrides S3RELAY_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Storage endpoint URL (overrides S3RELAY_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// Storage region (overrides S3RELAY_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Path-style addressing; bare flag means true (overrides S3RELAY_PATH_STYLE)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    path_style: Option<String>,

    /// Base for returned object URLs; `{bucket}` is substituted (overrides S3RELAY_PUBLIC_URL_BASE)
    #[arg(long)]
    public_url_base: Option<String>,

    /// Maximum files per upload (overrides S3RELAY_MAX_FILES)
    #[arg(long)]
    max_files: Option<String>,

    /// Maximum request body size in bytes (overrides S3RELAY_MAX_BODY_BYTES)
    #[arg(long)]
    max_body_bytes: Option<String>,
}

impl Cli {
    fn value_for(&self, var: &str) -> Option<String> {
        let value = match var {
            "S3RELAY_BIND" => &self.bind,
            "S3RELAY_ENDPOINT" => &self.endpoint,
            "S3RELAY_REGION" => &self.region,
            "S3RELAY_PATH_STYLE" => &self.path_style,
            "S3RELAY_PUBLIC_URL_BASE" => &self.public_url_base,
            "S3RELAY_MAX_FILES" => &self.max_files,
            "S3RELAY_MAX_BODY_BYTES" => &self.max_body_bytes,
            _ => return None,
        };
        value.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env_with(|var| cli.value_for(var))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let urls = PublicUrl::from_config(&config)?;
    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::connect(&config).await);
    tracing::info!(endpoint = store.name(), region = %config.region, "storage client configured");

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        urls,
        metrics_handle: s3relay_server::metrics::init_metrics(),
        start_time: Instant::now(),
    });

    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let local_addr = listener.local_addr().context("failed to read bound address")?;
    tracing::info!("s3relay listening on {}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
