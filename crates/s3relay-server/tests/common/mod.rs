#![allow(dead_code)]

use s3relay_core::storage::{MemoryStore, ObjectStore};
use s3relay_core::{Config, PublicUrl};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Config::default(), MemoryStore::new()).await
    }

    pub async fn start_with_config(config: Config) -> Self {
        Self::start_with(config, MemoryStore::new()).await
    }

    pub async fn start_with(config: Config, store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let addr = serve(config, store.clone()).await;

        Self {
            base_url: format!("http://{}", addr),
            addr,
            store,
        }
    }
}

/// Serves the relay over any store and returns the bound address.
pub async fn serve(mut config: Config, store: Arc<dyn ObjectStore>) -> SocketAddr {
    config.bind = "127.0.0.1:0".into();
    config.access_key = "TESTAKID".into();
    config.secret_key = "TESTSECRET".into();
    config.log_level = "warn".into();

    let state = Arc::new(s3relay_server::AppState {
        urls: PublicUrl::from_config(&config).unwrap(),
        config,
        store,
        metrics_handle: s3relay_server::metrics::init_metrics(),
        start_time: Instant::now(),
    });

    let app = s3relay_server::router::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

pub fn file_part(name: &str, data: &[u8]) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(data.to_vec()).file_name(name.to_string())
}
