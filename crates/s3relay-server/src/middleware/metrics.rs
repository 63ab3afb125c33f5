use axum::body::Body;
use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    metrics::counter!(crate::metrics::REQUEST_COUNTER, "route" => route.clone()).increment(1);
    metrics::histogram!(crate::metrics::REQUEST_DURATION, "route" => route).record(duration);

    let status = response.status().as_u16();
    if status >= 400 {
        metrics::counter!(crate::metrics::ERROR_COUNTER, "status" => status.to_string())
            .increment(1);
    }

    response
}
