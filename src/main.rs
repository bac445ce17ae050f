//! GatewayClass Exporter
//!
//! Exposes `gatewayapi_gatewayclass_info{name="..."} 1` for every
//! GatewayClass in the cluster, refreshed on each Prometheus scrape.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gatewayclass_exporter::adapters::{self, KubernetesResourceLister};
use gatewayclass_exporter::error::{Error, Result};
use gatewayclass_exporter::metrics::{MetricSeries, MetricsSynchronizer};
use gatewayclass_exporter::server::{self, MetricsServer, ScrapeHandler};
use gatewayclass_exporter::ResourceScope;

// =============================================================================
// CLI Arguments
// =============================================================================

/// GatewayClass Exporter - Gateway API GatewayClasses as Prometheus metrics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Kubernetes API server URL, used outside the cluster
    #[arg(long, env = "APISERVER")]
    apiserver: Option<String>,

    /// Path to a kubeconfig file, used outside the cluster
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Metrics server bind address
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:8080")]
    metrics_addr: String,

    /// Seconds to wait for in-flight scrapes on shutdown
    #[arg(long, env = "SHUTDOWN_GRACE_SECONDS", default_value = "10")]
    shutdown_grace_seconds: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args)?;

    let scope = ResourceScope::gateway_classes();
    info!("Starting GatewayClass exporter");
    info!("  Resource: {}", scope);
    info!("  Metrics address: {}", args.metrics_addr);

    // Create Kubernetes client
    let client = adapters::connect(args.apiserver.as_deref(), args.kubeconfig.as_deref())
        .await
        .map_err(|e| {
            error!("Error creating Kubernetes client: {}", e);
            e
        })?;

    info!("Connected to Kubernetes cluster");

    let lister = Arc::new(KubernetesResourceLister::new(client, scope));
    let series = Arc::new(MetricSeries::new()?);
    let synchronizer = Arc::new(MetricsSynchronizer::new(lister, series));

    let shutdown = CancellationToken::new();
    let handler = ScrapeHandler::new(synchronizer, shutdown.clone());
    let metrics_server = MetricsServer::bind(
        &args.metrics_addr,
        handler,
        Duration::from_secs(args.shutdown_grace_seconds),
    )
    .await?;

    // Handle shutdown gracefully
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        server::shutdown_signal().await;
        signal_token.cancel();
    });

    metrics_server.serve(shutdown).await?;

    info!("Exporter shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

/// Level from `--log-level` (falls back to info) plus quieter client crates.
fn log_filter(log_level: &str) -> Result<EnvFilter> {
    let level = log_level.parse::<Level>().unwrap_or(Level::INFO);
    let directive = |raw: &str| {
        raw.parse::<Directive>()
            .map_err(|e| Error::Configuration(format!("invalid log directive {}: {}", raw, e)))
    };

    Ok(EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive(directive("hyper=warn")?)
        .add_directive(directive("kube=info")?)
        .add_directive(directive("tower=warn")?))
}

fn init_logging(args: &Args) -> Result<()> {
    let filter = log_filter(&args.log_level)?;

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["gatewayclass-exporter"]).unwrap();

        assert_eq!(args.metrics_addr, "0.0.0.0:8080");
        assert_eq!(args.shutdown_grace_seconds, 10);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_args_explicit_endpoint() {
        let args = Args::try_parse_from([
            "gatewayclass-exporter",
            "--apiserver",
            "https://10.0.0.1:6443",
            "--kubeconfig",
            "/etc/kube/config",
        ])
        .unwrap();

        assert_eq!(args.apiserver.as_deref(), Some("https://10.0.0.1:6443"));
        assert_eq!(args.kubeconfig, Some(PathBuf::from("/etc/kube/config")));
    }

    #[test]
    fn test_log_filter_quiets_client_crates() {
        let filter = log_filter("DEBUG").unwrap().to_string();

        assert!(filter.contains("debug"));
        assert!(filter.contains("hyper=warn"));
        assert!(filter.contains("kube=info"));
        assert!(filter.contains("tower=warn"));
    }

    #[test]
    fn test_log_filter_unknown_level_falls_back_to_info() {
        let filter = log_filter("chatty").unwrap().to_string();
        assert!(filter.split(',').any(|d| d == "info"), "filter: {}", filter);
    }
}
