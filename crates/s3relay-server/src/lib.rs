pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;

use metrics_exporter_prometheus::PrometheusHandle;
use s3relay_core::storage::ObjectStore;
use s3relay_core::{Config, PublicUrl};
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ObjectStore>,
    pub urls: PublicUrl,
    pub metrics_handle: PrometheusHandle,
    pub start_time: Instant,
}
