//! Tracing setup and per-request logging.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::env;
use std::time::Instant;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("mymine_api={},tower_http=info", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(&filter_directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    if result.is_ok() {
        tracing::debug!(directive = %filter_directive, json, "Tracing initialized");
    }
}

/// Logs one line per request with status and latency.
pub async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "Request completed"
        );
    } else {
        tracing::info!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing("debug", false);
        init_tracing("info", true);
    }
}
