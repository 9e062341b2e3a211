//! Shared test utilities for hil-api integration tests.

#![allow(dead_code)]

use hil_api::rest::{AppState, create_router};
use hil_api::{AuditLogger, Orchestrator, Store, VlanPool, VlanRange};
use hil_switch::{DriverRegistry, MockFabric, MockFactory};
use reqwest::{Client, Response as ReqwestResponse};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// VLAN tags seeded into every test store.
pub const TEST_VLANS: &str = "100-109";

/// Allocate an available port for testing.
pub fn allocate_port() -> u16 {
    portpicker::pick_unused_port().expect("No available port")
}

/// Seed the VLAN pool of a fresh store.
pub fn seed_vlans(store: &Store, vlans: &str) {
    let ranges = VlanRange::parse_list(vlans).expect("Invalid VLAN list");
    store
        .with_transaction(|tx| VlanPool::seed(tx, &ranges))
        .expect("Failed to seed VLANs");
}

/// Orchestrator over an existing store, with a mock-only registry on a new
/// fabric.
pub fn orchestrator_over(store: Arc<Store>) -> (Orchestrator, MockFabric) {
    let fabric = MockFabric::new();
    let registry = DriverRegistry::builder()
        .factory(Arc::new(MockFactory::new(fabric.clone())))
        .build();

    let api = Orchestrator::new(
        store,
        Arc::new(registry),
        Arc::new(AuditLogger::new_noop()),
    )
    .expect("Failed to create orchestrator");
    (api, fabric)
}

/// In-memory orchestrator with a mock-only registry and the given VLAN pool.
pub fn orchestrator_with_vlans(vlans: &str) -> (Orchestrator, MockFabric) {
    let store = Store::in_memory().expect("Failed to open store");
    seed_vlans(&store, vlans);
    orchestrator_over(Arc::new(store))
}

pub fn orchestrator() -> (Orchestrator, MockFabric) {
    orchestrator_with_vlans(TEST_VLANS)
}

/// Test server wrapper running the REST API over a mock fabric.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub fabric: MockFabric,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    /// Spawn a test server with in-memory storage.
    pub async fn spawn() -> Self {
        let (api, fabric) = orchestrator();
        let app_state = Arc::new(AppState { api: Arc::new(api) });
        let router = create_router(app_state);

        let addr: SocketAddr = format!("127.0.0.1:{}", allocate_port()).parse().unwrap();
        let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
        let actual_addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        // Small delay to ensure server is ready
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        Self {
            addr: actual_addr,
            client: Client::new(),
            fabric,
            shutdown_tx,
        }
    }

    /// Get base URL for the REST API.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Perform a GET request.
    pub async fn get(&self, path: &str) -> ReqwestResponse {
        self.client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Perform a PUT request without a body.
    pub async fn put(&self, path: &str) -> ReqwestResponse {
        self.client
            .put(format!("{}{}", self.base_url(), path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Perform a PUT request with JSON body.
    pub async fn put_json<T: Serialize>(&self, path: &str, body: &T) -> ReqwestResponse {
        self.client
            .put(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    /// Perform a POST request without a body.
    pub async fn post(&self, path: &str) -> ReqwestResponse {
        self.client
            .post(format!("{}{}", self.base_url(), path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Perform a POST request with JSON body.
    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> ReqwestResponse {
        self.client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    /// Perform a DELETE request.
    pub async fn delete(&self, path: &str) -> ReqwestResponse {
        self.client
            .delete(format!("{}{}", self.base_url(), path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}
