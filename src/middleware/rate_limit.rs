use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Type alias for the global governor layer (IP-based rate limiting)
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Per-IP limiter for the whole API. One token is replenished every
/// `rate_limit_per_ms` milliseconds, up to `rate_limit_burst`.
pub fn create_global_governor(config: &Config) -> AppResult<GlobalGovernorLayer> {
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(config.rate_limit_per_ms)
        .burst_size(config.rate_limit_burst)
        .finish()
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid rate limit: per_ms={} burst={}",
                config.rate_limit_per_ms, config.rate_limit_burst
            ))
        })?;

    Ok(GovernorLayer::new(Arc::new(governor_config)))
}

/// Middleware to log request details and flag rejected requests
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(
        client_ip = %addr.ip(),
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}
