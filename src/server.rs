//! Scrape Server
//!
//! Serves `/metrics` over HTTP/1. Every scrape first synchronizes the
//! metric series with the cluster, then renders it. Upstream failures are
//! logged and the last known series is served instead.
//!
//! Shutdown stops the accept loop, releases the listener and drains
//! in-flight connections for at most the configured grace period.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::metrics::MetricsSynchronizer;

/// Path the metric series is exposed on
pub const METRICS_PATH: &str = "/metrics";

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

// =============================================================================
// Scrape Handler
// =============================================================================

/// Synchronizes and renders the metric series for one scrape.
#[derive(Debug, Clone)]
pub struct ScrapeHandler {
    synchronizer: Arc<MetricsSynchronizer>,
    shutdown: CancellationToken,
}

impl ScrapeHandler {
    /// Create a handler whose in-flight syncs are abandoned once `shutdown` fires.
    pub fn new(synchronizer: Arc<MetricsSynchronizer>, shutdown: CancellationToken) -> Self {
        Self {
            synchronizer,
            shutdown,
        }
    }

    /// Refresh the series and render it.
    ///
    /// Only fails if encoding fails; listing errors fall back to the
    /// current series.
    pub async fn scrape(&self) -> Result<String> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                debug!("Shutdown in progress, serving current series without sync");
            }
            result = self.synchronizer.sync() => {
                if let Err(e) = result {
                    debug!("Serving last known series: {}", e);
                }
            }
        }

        self.synchronizer.series().render()
    }
}

async fn route<B>(
    req: Request<B>,
    handler: ScrapeHandler,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let response = match req.uri().path() {
        METRICS_PATH => match handler.scrape().await {
            Ok(body) => respond(StatusCode::OK, prometheus::TEXT_FORMAT, body),
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
                respond(StatusCode::INTERNAL_SERVER_ERROR, PLAIN_TEXT, "encoding failed")
            }
        },
        "/healthz" | "/livez" | "/readyz" => respond(StatusCode::OK, PLAIN_TEXT, "ok"),
        _ => respond(StatusCode::NOT_FOUND, PLAIN_TEXT, "not found"),
    };
    Ok(response)
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

// =============================================================================
// Metrics Server
// =============================================================================

/// HTTP host for the scrape handler.
#[derive(Debug)]
pub struct MetricsServer {
    listener: TcpListener,
    handler: ScrapeHandler,
    shutdown_grace: Duration,
}

impl MetricsServer {
    /// Bind the listening socket.
    pub async fn bind(
        addr: &str,
        handler: ScrapeHandler,
        shutdown_grace: Duration,
    ) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid metrics server address: {}", e)))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal(format!("Failed to bind metrics server: {}", e)))?;

        Ok(Self {
            listener,
            handler,
            shutdown_grace,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve scrapes until `shutdown` is cancelled, then drain connections.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        let Self {
            listener,
            handler,
            shutdown_grace,
        } = self;

        info!("Metrics server listening on {}", listener.local_addr()?);
        let graceful = GracefulShutdown::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Metrics server accept error: {}", e);
                            continue;
                        }
                    };

                    let handler = handler.clone();
                    let service = service_fn(move |req| route(req, handler.clone()));
                    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            debug!(peer = %peer, "Metrics server connection error: {}", e);
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("Shutting down metrics server");
                    break;
                }
            }
        }

        drop(listener);

        tokio::select! {
            _ = graceful.shutdown() => {
                info!("All scrape connections closed");
            }
            _ = tokio::time::sleep(shutdown_grace) => {
                warn!(
                    "Abandoning scrape connections still open after {:?}",
                    shutdown_grace
                );
            }
        }

        Ok(())
    }
}

// =============================================================================
// Signals
// =============================================================================

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
