use std::sync::OnceLock;

use metrics_exporter_prometheus::PrometheusHandle;

pub const REQUEST_COUNTER: &str = "s3relay_requests_total";
pub const REQUEST_DURATION: &str = "s3relay_request_duration_seconds";
pub const ERROR_COUNTER: &str = "s3relay_errors_total";
pub const OBJECTS_UPLOADED: &str = "s3relay_objects_uploaded_total";
pub const BYTES_UPLOADED: &str = "s3relay_uploaded_bytes_total";
pub const UPSTREAM_FAILURES: &str = "s3relay_upstream_failures_total";

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("Failed to install Prometheus recorder")
        })
        .clone()
}
