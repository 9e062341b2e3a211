//! REST API integration tests for hil-api.
//!
//! These tests drive the HTTP surface against an in-memory store and the mock
//! switch fabric.

mod common;

use serde_json::{Value, json};

/// Percent-encoded `gi1/0/1`.
const PORT: &str = "gi1%2F0%2F1";

async fn create_anvil(server: &common::TestServer) {
    assert_eq!(server.put("/group/acme").await.status(), 201);
    assert_eq!(
        server
            .put_json("/project/anvil", &json!({"group": "acme"}))
            .await
            .status(),
        201
    );
    assert_eq!(server.put("/node/node-99").await.status(), 201);
    assert_eq!(
        server
            .put_json(
                "/node/node-99/nic/eth0",
                &json!({"macaddr": "de-ad-be-ef-20-14"})
            )
            .await
            .status(),
        201
    );
    assert_eq!(
        server
            .post_json("/project/anvil/connect_node", &json!({"node": "node-99"}))
            .await
            .status(),
        204
    );
}

async fn create_switch(server: &common::TestServer) {
    let response = server
        .put_json(
            "/switch/sw0",
            &json!({
                "type": "mock",
                "hostname": "sw0.example",
                "username": "admin",
                "password": "secret"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    assert_eq!(
        server
            .put(&format!("/switch/sw0/port/{PORT}"))
            .await
            .status(),
        201
    );
}

// =============================================================================
// System
// =============================================================================

#[tokio::test]
async fn test_get_version() {
    let server = common::TestServer::spawn().await;

    let response = server.get("/version").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body["version"].is_string());

    server.shutdown().await;
}

#[tokio::test]
async fn test_openapi_document() {
    let server = common::TestServer::spawn().await;

    let response = server
        .client
        .get(format!("http://{}/api-docs/openapi.json", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body["paths"]["/v1/node/{node}"].is_object());
    assert!(body["paths"]["/v1/switch/{switch}/port/{port}/revert"].is_object());

    server.shutdown().await;
}

// =============================================================================
// Topology
// =============================================================================

#[tokio::test]
async fn test_network_lifecycle_programs_switch() {
    let server = common::TestServer::spawn().await;
    create_anvil(&server).await;
    create_switch(&server).await;

    let response = server
        .post_json(
            &format!("/switch/sw0/port/{PORT}/connect_nic"),
            &json!({"node": "node-99", "nic": "eth0"}),
        )
        .await;
    assert_eq!(response.status(), 204);

    let response = server
        .put_json("/network/hammernet", &json!({"project": "anvil"}))
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let vlan = body["vlan"].as_u64().unwrap() as u16;

    let response = server
        .post_json(
            "/node/node-99/nic/eth0/connect_network",
            &json!({"network": "hammernet"}),
        )
        .await;
    assert_eq!(response.status(), 204);
    assert_eq!(server.fabric.vlan_of("sw0", "gi1/0/1"), Some(vlan));

    let response = server.get("/node/node-99").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["project"], "anvil");
    assert_eq!(body["nics"][0]["macaddr"], "DE:AD:BE:EF:20:14");
    assert_eq!(body["nics"][0]["network"], "hammernet");
    assert_eq!(body["nics"][0]["port"]["port"], "gi1/0/1");

    let body: Value = server.get("/network/hammernet").await.json().await.unwrap();
    assert_eq!(body["vlan"].as_u64().unwrap() as u16, vlan);
    assert_eq!(body["nics"][0]["owner"], "node-99");

    let response = server.post("/node/node-99/nic/eth0/detach_network").await;
    assert_eq!(response.status(), 204);
    assert_eq!(server.fabric.vlan_of("sw0", "gi1/0/1"), None);

    server.shutdown().await;
}

#[tokio::test]
async fn test_listings() {
    let server = common::TestServer::spawn().await;
    create_anvil(&server).await;
    create_switch(&server).await;
    server.put("/node/node-100").await;

    let body: Value = server.get("/projects").await.json().await.unwrap();
    assert_eq!(body, json!(["anvil"]));

    let body: Value = server.get("/nodes/free").await.json().await.unwrap();
    assert_eq!(body, json!(["node-100"]));

    let body: Value = server
        .get("/project/anvil/nodes")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!(["node-99"]));

    let body: Value = server.get("/switches").await.json().await.unwrap();
    assert_eq!(body, json!(["sw0"]));

    let body: Value = server.get("/switch/sw0").await.json().await.unwrap();
    assert_eq!(body["vendor"], "mock");
    assert_eq!(body["ports"], json!(["gi1/0/1"]));

    server.shutdown().await;
}

#[tokio::test]
async fn test_users_and_groups() {
    let server = common::TestServer::spawn().await;

    let response = server
        .put_json("/user/alice", &json!({"password": "hunter2"}))
        .await;
    assert_eq!(response.status(), 201);
    assert_eq!(server.put("/group/acme").await.status(), 201);

    let response = server
        .post_json("/group/acme/add_user", &json!({"user": "alice"}))
        .await;
    assert_eq!(response.status(), 204);

    let body: Value = server.get("/group/acme/users").await.json().await.unwrap();
    assert_eq!(body, json!(["alice"]));

    let response = server
        .post_json("/group/acme/remove_user", &json!({"user": "alice"}))
        .await;
    assert_eq!(response.status(), 204);

    assert_eq!(server.delete("/user/alice").await.status(), 204);
    assert_eq!(server.delete("/group/acme").await.status(), 204);

    server.shutdown().await;
}

#[tokio::test]
async fn test_verify_user_password() {
    let server = common::TestServer::spawn().await;
    server
        .put_json("/user/alice", &json!({"password": "hunter2"}))
        .await;

    let response = server
        .post_json("/user/alice/verify", &json!({"password": "hunter2"}))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["valid"], true);

    let body: Value = server
        .post_json("/user/alice/verify", &json!({"password": "hunter3"}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["valid"], false);

    let response = server
        .post_json("/user/bob/verify", &json!({"password": "hunter2"}))
        .await;
    assert_eq!(response.status(), 404);

    server.shutdown().await;
}

#[tokio::test]
async fn test_headnode_endpoints() {
    let server = common::TestServer::spawn().await;
    create_anvil(&server).await;
    server
        .put_json("/network/hammernet", &json!({"project": "anvil"}))
        .await;

    let response = server
        .put_json("/headnode/anvil-hn", &json!({"project": "anvil"}))
        .await;
    assert_eq!(response.status(), 201);
    let response = server
        .put_json(
            "/headnode/anvil-hn/hnic/hn0",
            &json!({"macaddr": "02:00:00:00:00:01"}),
        )
        .await;
    assert_eq!(response.status(), 201);
    let response = server
        .post_json(
            "/headnode/anvil-hn/hnic/hn0/connect_network",
            &json!({"network": "hammernet"}),
        )
        .await;
    assert_eq!(response.status(), 204);

    let body: Value = server.get("/headnode/anvil-hn").await.json().await.unwrap();
    assert_eq!(body["project"], "anvil");
    assert_eq!(body["hnics"][0]["network"], "hammernet");

    let response = server
        .post("/headnode/anvil-hn/hnic/hn0/detach_network")
        .await;
    assert_eq!(response.status(), 204);

    server.shutdown().await;
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn test_not_found_body() {
    let server = common::TestServer::spawn().await;

    let response = server.get("/node/missing").await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "not_found");
    assert_eq!(body["code"], 404);
    assert!(body["error"].as_str().unwrap().contains("missing"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_and_blocked_are_conflicts() {
    let server = common::TestServer::spawn().await;
    create_anvil(&server).await;

    let response = server.put("/node/node-99").await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "duplicate");

    let response = server.delete("/project/anvil").await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "blocked");

    server.shutdown().await;
}

#[tokio::test]
async fn test_invalid_arguments_are_bad_requests() {
    let server = common::TestServer::spawn().await;
    server.put("/node/node-1").await;

    let response = server
        .put_json("/node/node-1/nic/eth0", &json!({"macaddr": "zz"}))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_argument");

    let response = server
        .put_json("/switch/sw0", &json!({"hostname": "h"}))
        .await;
    assert_eq!(response.status(), 400);

    let response = server
        .put_json(
            "/switch/sw0",
            &json!({"type": "frobnicator", "hostname": "h", "username": "u", "password": "p"}),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "schema");

    server.shutdown().await;
}

#[tokio::test]
async fn test_vlan_exhaustion_is_unavailable() {
    let server = common::TestServer::spawn().await;
    create_anvil(&server).await;

    // The test pool holds ten tags.
    for i in 0..10 {
        let response = server
            .put_json(&format!("/network/net-{i}"), &json!({"project": "anvil"}))
            .await;
        assert_eq!(response.status(), 201);
    }

    let response = server
        .put_json("/network/one-too-many", &json!({"project": "anvil"}))
        .await;
    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "resource_exhausted");

    server.shutdown().await;
}

#[tokio::test]
async fn test_driver_failure_is_bad_gateway() {
    let server = common::TestServer::spawn().await;
    create_anvil(&server).await;
    create_switch(&server).await;
    server
        .post_json(
            &format!("/switch/sw0/port/{PORT}/connect_nic"),
            &json!({"node": "node-99", "nic": "eth0"}),
        )
        .await;
    server
        .put_json("/network/hammernet", &json!({"project": "anvil"}))
        .await;

    server.fabric.fail_port("sw0", "gi1/0/1");
    let response = server
        .post_json(
            "/node/node-99/nic/eth0/connect_network",
            &json!({"network": "hammernet"}),
        )
        .await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "driver");

    // Nothing changed logically.
    let body: Value = server.get("/node/node-99").await.json().await.unwrap();
    assert!(body["nics"][0]["network"].is_null());

    let response = server.post(&format!("/switch/sw0/port/{PORT}/revert")).await;
    assert_eq!(response.status(), 502);

    server.shutdown().await;
}
