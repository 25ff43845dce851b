//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use throttle_gate::audit::MemoryStore;
use throttle_gate::config::GateConfig;
use throttle_gate::http::HttpServer;
use throttle_gate::lifecycle::{startup, Shutdown};

/// A running gate bound to an ephemeral port, with its in-process store.
pub struct TestGate {
    pub addr: SocketAddr,
    pub store: MemoryStore,
    pub shutdown: Shutdown,
}

impl TestGate {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a gate backed by a [`MemoryStore`] and return handles to both.
pub async fn start_gate(config: GateConfig) -> TestGate {
    let store = MemoryStore::new();
    let shutdown = Shutdown::new();
    let decider = startup::start_core(&config, store.clone(), &shutdown);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, decider);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGate {
        addr,
        store,
        shutdown,
    }
}

/// Poll until `bucket` holds at least `want` records, for up to 5 seconds.
/// Returns the final count either way.
#[allow(dead_code)]
pub async fn wait_for_records(store: &MemoryStore, bucket: &str, want: usize) -> usize {
    for _ in 0..250 {
        let len = store.bucket_len(bucket);
        if len >= want {
            return len;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    store.bucket_len(bucket)
}
