//! Request metrics.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Counts requests and records their latency through the `metrics` facade.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;

    metrics::counter!("http_requests_total").increment(1);
    metrics::histogram!("http_request_duration_seconds").record(start.elapsed().as_secs_f64());
    response
}
