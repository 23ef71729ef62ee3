//! HTTP-level tests for the management API.

use std::sync::Arc;
use std::time::Duration;

use alertmux::api::{self, ApiState};
use alertmux::engine::TreeEngine;
use alertmux::lifecycle::Shutdown;
use alertmux::manager::TenantManager;
use alertmux::model::TenantId;
use alertmux::pool::InstancePool;
use alertmux::store::{ConfigStore, MemoryStore};

mod common;
use common::{overlay_config, primary_config};

const API_KEY: &str = "test-api-key";

/// Serve the API on an ephemeral port; returns the base url and shutdown.
async fn start_api() -> (String, Shutdown, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let pool = Arc::new(InstancePool::new(Arc::new(TreeEngine)));
    let manager = Arc::new(TenantManager::new(store.clone(), pool.clone(), None));

    store
        .provision(TenantId::from("org-1"), primary_config("default"))
        .await
        .unwrap();

    let state = ApiState {
        manager,
        pool,
        api_key: Arc::new(API_KEY.to_string()),
    };
    let router = api::build_router(state, Duration::from_secs(5));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = api::serve(router, listener, rx).await;
    });

    (format!("http://{addr}"), shutdown, store)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_requests_without_bearer_token_are_unauthorized() {
    let (url, _shutdown, _) = start_api().await;

    let res = client()
        .get(format!("{url}/api/v1/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn test_save_get_delete_over_http() {
    let (url, _shutdown, _) = start_api().await;
    let client = client();

    let overlay = overlay_config("http-cfg", "hook");
    let res = client
        .post(format!("{url}/api/v1/tenants/org-1/extra-configuration"))
        .bearer_auth(API_KEY)
        .json(&overlay)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 202);

    let res = client
        .get(format!("{url}/api/v1/tenants/org-1/configuration"))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["extra_configuration"]["identifier"], "http-cfg");

    let res = client
        .delete(format!("{url}/api/v1/tenants/org-1/extra-configuration/http-cfg"))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 202);

    let res = client
        .get(format!("{url}/api/v1/tenants/org-1/configuration"))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body.get("extra_configuration").is_none());
}

#[tokio::test]
async fn test_error_kinds_map_to_http_statuses() {
    let (url, _shutdown, _) = start_api().await;
    let client = client();

    // Unknown tenant → 404.
    let res = client
        .post(format!("{url}/api/v1/tenants/org-999/extra-configuration"))
        .bearer_auth(API_KEY)
        .json(&overlay_config("cfg", "hook"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    // Occupied slot under a different identifier → 409, naming the holder.
    let res = client
        .post(format!("{url}/api/v1/tenants/org-1/extra-configuration"))
        .bearer_auth(API_KEY)
        .json(&overlay_config("first", "hook"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 202);

    let res = client
        .post(format!("{url}/api/v1/tenants/org-1/extra-configuration"))
        .bearer_auth(API_KEY)
        .json(&overlay_config("second", "hook2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("first"));

    // Missing merge matchers → 400 before any storage access.
    let mut invalid = overlay_config("third", "hook3");
    invalid.merge_matchers.clear();
    let res = client
        .post(format!("{url}/api/v1/tenants/org-1/extra-configuration"))
        .bearer_auth(API_KEY)
        .json(&invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_route_test_endpoint_uses_running_instance() {
    let (url, _shutdown, _) = start_api().await;
    let client = client();

    client
        .post(format!("{url}/api/v1/tenants/org-1/extra-configuration"))
        .bearer_auth(API_KEY)
        .json(&overlay_config("cfg", "prod-webhook"))
        .send()
        .await
        .unwrap();

    let res = client
        .post(format!("{url}/api/v1/tenants/org-1/route-test"))
        .bearer_auth(API_KEY)
        .json(&serde_json::json!({"env": "prod"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["receivers"][0], "prod-webhook");
}
