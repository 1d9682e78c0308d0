//! Comic Universe gateway entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags or environment variables, validated once
//!    into [`gateway::GatewayConfig`]. A missing API key stops the process
//!    before anything binds.
//! 2. **Wire observability**: configure `tracing-subscriber` with a plain or
//!    JSON formatter and, when enabled, an OpenTelemetry OTLP exporter. All
//!    `tracing` spans and events emitted by every crate in the workspace flow
//!    through this subscriber.
//! 3. **Construct infrastructure**: create the [`comicvine::ComicVineClient`],
//!    inject it into [`gateway::QueryGateway`], and build the router.
//! 4. **Serve** until Ctrl-C or SIGTERM, then drain in-flight requests.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use comicvine::{ClientOptions, ComicVineClient};
use gateway::{GatewayConfig, QueryGateway};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use server::{build_router, RateLimit, ServerConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Comic Universe search gateway
#[derive(Parser)]
#[command(name = "comic-gateway")]
#[command(about = "Search and detail proxy in front of the Comic Vine catalog")]
#[command(version)]
struct Cli {
    /// Comic Vine API key (required)
    #[arg(long, env = "COMIC_VINE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Browser origin allowed by CORS [default: http://localhost:3000]
    #[arg(long, env = "CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind_addr: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    port: u16,

    /// Catalog API root
    #[arg(long, env = "COMIC_VINE_BASE_URL", default_value = comicvine::DEFAULT_BASE_URL)]
    catalog_base_url: String,

    /// Requests allowed per client IP per window
    #[arg(long, env = "RATE_LIMIT_MAX", default_value = "100")]
    rate_limit_max: NonZeroU32,

    /// Rate-limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = 900)]
    rate_limit_window_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Export spans over OTLP (endpoint from OTEL_EXPORTER_OTLP_ENDPOINT)
    #[arg(long, env = "OTEL_ENABLED")]
    otel_enabled: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let tracer_provider = init_tracing(cli.log_json, cli.otel_enabled)?;

    let outcome = run(cli).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %format!("{e:#}"), "gateway stopped with an error");
    }

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("failed to flush traces: {e}");
        }
    }
    outcome
}

async fn run(cli: Cli) -> Result<()> {
    let config =
        GatewayConfig::new(cli.api_key, cli.cors_origin).context("invalid gateway configuration")?;

    let client = ComicVineClient::new(
        config.api_key().clone(),
        ClientOptions {
            base_url: cli.catalog_base_url,
            ..ClientOptions::default()
        },
    )
    .context("failed to create catalog client")?;
    let gateway = QueryGateway::new(Arc::new(client));

    let server_config = ServerConfig {
        rate_limit: RateLimit {
            max_requests: cli.rate_limit_max,
            window: Duration::from_secs(cli.rate_limit_window_secs),
        },
        ..ServerConfig::from_gateway(&config)
    };
    let app = build_router(gateway, &server_config).context("failed to build router")?;

    let addr = SocketAddr::new(cli.bind_addr, cli.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        allowed_origin = config.allowed_origin(),
        "Comic Universe gateway listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("Comic Universe gateway stopped");
    Ok(())
}

/// Installs the global subscriber. Returns the tracer provider when OTLP export
/// is enabled so it can be flushed on exit.
fn init_tracing(log_json: bool, otel_enabled: bool) -> Result<Option<TracerProvider>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = if otel_enabled {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .build()
            .context("failed to build OTLP exporter")?;
        Some(
            TracerProvider::builder()
                .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
                .build(),
        )
    } else {
        None
    };
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("comic-gateway")));

    tracing_subscriber::registry()
        .with(filter)
        .with(log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!log_json).then(tracing_subscriber::fmt::layer))
        .with(otel_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(provider)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
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
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received; draining connections");
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_documented_deployment() {
        let cli = Cli::try_parse_from(["comic-gateway", "--api-key", "k"]).unwrap();
        assert_eq!(cli.port, 4000);
        assert_eq!(cli.bind_addr, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(cli.catalog_base_url, comicvine::DEFAULT_BASE_URL);
        assert_eq!(cli.rate_limit_max.get(), 100);
        assert_eq!(cli.rate_limit_window_secs, 900);
    }
}
