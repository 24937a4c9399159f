//! End-to-end poll cycles against an in-process mock of the vSphere REST API

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use esxstat_core::{
    Category, Connection, EndpointClient, EndpointConfig, PollError, Poller, StatValue,
    StatsStore,
};
use esxstat_vsphere::VsphereClient;

const TOKEN: &str = "session-token-1";
/// `monitor:secret`
const BASIC_AUTH: &str = "Basic bW9uaXRvcjpzZWNyZXQ=";
const GIB: u64 = 1_073_741_824;

#[derive(Default)]
struct MockVcenter {
    logins: AtomicUsize,
    logouts: AtomicUsize,
    fail_datastores: AtomicBool,
    /// Delay for per-host VM listings, in milliseconds
    placement_delay_ms: AtomicU64,
}

type Shared = Arc<MockVcenter>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("vmware-api-session-id")
        .is_some_and(|v| v.as_bytes() == TOKEN.as_bytes())
}

fn hosts() -> Vec<Value> {
    vec![
        json!({"host": "host-1", "name": "esxi 01", "connection_state": "CONNECTED", "power_state": "POWERED_ON"}),
        json!({"host": "host-2", "name": "ESXi-02", "connection_state": "NOT_RESPONDING"}),
    ]
}

/// VM rows paired with the host they run on
fn vms() -> Vec<(&'static str, Value)> {
    vec![
        (
            "host-1",
            json!({"vm": "vm-1", "name": "Web 01", "power_state": "POWERED_ON", "cpu_count": 2, "memory_size_MiB": 4096}),
        ),
        (
            "host-1",
            json!({"vm": "vm-2", "name": "db", "power_state": "POWERED_OFF", "cpu_count": 4, "memory_size_MiB": 16384}),
        ),
    ]
}

fn datastores() -> Vec<Value> {
    vec![json!({
        "datastore": "datastore-1",
        "name": "Datastore 1",
        "type": "VMFS",
        "free_space": 50 * GIB,
        "capacity": 100 * GIB
    })]
}

fn filter(rows: Vec<Value>, id_field: &str, wanted: Option<&String>) -> Vec<Value> {
    rows.into_iter()
        .filter(|row| wanted.is_none_or(|id| row[id_field] == id.as_str()))
        .collect()
}

async fn create_session(State(mock): State<Shared>, headers: HeaderMap) -> Response {
    let valid = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| v.as_bytes() == BASIC_AUTH.as_bytes());
    if !valid {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    mock.logins.fetch_add(1, Ordering::SeqCst);
    Json(TOKEN).into_response()
}

async fn delete_session(State(mock): State<Shared>, headers: HeaderMap) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    mock.logouts.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn list_hosts(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(filter(hosts(), "host", query.get("hosts"))).into_response()
}

async fn list_vms(
    State(mock): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if query.contains_key("hosts") {
        let delay = mock.placement_delay_ms.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let rows: Vec<Value> = vms()
        .into_iter()
        .filter(|(host, _)| query.get("hosts").is_none_or(|h| h == host))
        .map(|(_, row)| row)
        .collect();
    Json(rows).into_response()
}

async fn vm_info(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some((_, row)) = vms().into_iter().find(|(_, row)| row["vm"] == id.as_str()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    Json(json!({
        "name": row["name"],
        "power_state": row["power_state"],
        "guest_OS": "UBUNTU_64",
        "cpu": {"count": row["cpu_count"], "cores_per_socket": 1},
        "memory": {"size_MiB": row["memory_size_MiB"], "hot_add_enabled": false}
    }))
    .into_response()
}

async fn vm_identity(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id != "vm-1" {
        // vCenter answers 503 while VMware Tools is not running
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({
        "ip_address": "10.0.0.21",
        "host_name": "web01",
        "name": "UBUNTU_64",
        "family": "LINUX",
        "full_name": {"default_message": "Ubuntu Linux (64-bit)", "id": "vmsg.guest", "args": []}
    }))
    .into_response()
}

async fn vm_tools(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let run_state = if id == "vm-1" { "RUNNING" } else { "NOT_RUNNING" };
    Json(json!({"run_state": run_state, "version_status": "CURRENT"})).into_response()
}

async fn list_datastores(
    State(mock): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if mock.fail_datastores.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "datastore service down").into_response();
    }
    Json(filter(datastores(), "datastore", query.get("datastores"))).into_response()
}

async fn datastore_info(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id != "datastore-1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({"name": "Datastore 1", "type": "VMFS", "accessible": true, "free_space": 50 * GIB}))
        .into_response()
}

async fn spawn_mock(mock: Shared) -> String {
    let app = Router::new()
        .route("/api/session", post(create_session).delete(delete_session))
        .route("/api/vcenter/host", get(list_hosts))
        .route("/api/vcenter/vm", get(list_vms))
        .route("/api/vcenter/vm/{id}", get(vm_info))
        .route("/api/vcenter/vm/{id}/guest/identity", get(vm_identity))
        .route("/api/vcenter/vm/{id}/tools", get(vm_tools))
        .route("/api/vcenter/datastore", get(list_datastores))
        .route("/api/vcenter/datastore/{id}", get(datastore_info))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn endpoint(url: &str, password: &str) -> EndpointConfig {
    EndpointConfig::new(url, "monitor", password).with_monitored(Category::ALL)
}

fn text(value: &str) -> StatValue {
    StatValue::from(value)
}

#[tokio::test]
async fn test_full_cycle_against_rest_api() {
    let mock = Arc::new(MockVcenter::default());
    let url = spawn_mock(mock.clone()).await;
    let store = Arc::new(StatsStore::new());
    let poller = Poller::new(
        Arc::new(VsphereClient::new()),
        endpoint(&url, "secret"),
        store.clone(),
    );

    let report = poller.update().await.unwrap();
    assert!(report.is_success(), "unexpected errors: {:?}", report.errors);
    assert!(report.refreshed(Category::Hosts));
    assert!(report.refreshed(Category::Datastores));
    assert!(report.refreshed(Category::Vms));

    let hosts = store.snapshot(Category::Hosts).await;
    let keys: Vec<&str> = hosts.records.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["esxi-02", "esxi_01"]);

    let esxi01 = &hosts.records["esxi_01"];
    assert_eq!(esxi01.get("name"), Some(&text("esxi 01")));
    assert_eq!(esxi01.get("connection_state"), Some(&text("connected")));
    assert_eq!(esxi01.get("power_state"), Some(&text("poweredOn")));
    assert_eq!(esxi01.get("vm_count"), Some(&StatValue::Integer(2)));

    let esxi02 = &hosts.records["esxi-02"];
    assert_eq!(esxi02.get("connection_state"), Some(&text("notResponding")));
    assert_eq!(esxi02.get("vm_count"), Some(&StatValue::Integer(0)));
    assert!(!esxi02.contains("power_state"));

    let datastore = store.get(Category::Datastores, "datastore_1").await.unwrap();
    assert_eq!(datastore.get("type"), Some(&text("VMFS")));
    assert_eq!(datastore.get("total_space_gb"), Some(&StatValue::Float(100.0)));
    assert_eq!(datastore.get("free_space_gb"), Some(&StatValue::Float(50.0)));
    assert_eq!(datastore.get("accessible"), Some(&StatValue::Bool(true)));

    let web = store.get(Category::Vms, "web_01").await.unwrap();
    assert_eq!(web.get("power_state"), Some(&text("poweredOn")));
    assert_eq!(web.get("guest_os"), Some(&text("Ubuntu Linux (64-bit)")));
    assert_eq!(web.get("ip_address"), Some(&text("10.0.0.21")));
    assert_eq!(web.get("host"), Some(&text("esxi 01")));
    assert_eq!(web.get("tools_status"), Some(&text("guestToolsRunning")));
    assert_eq!(web.get("memory_size_mb"), Some(&StatValue::Integer(4096)));

    let db = store.get(Category::Vms, "db").await.unwrap();
    assert_eq!(db.get("power_state"), Some(&text("poweredOff")));
    assert_eq!(db.get("guest_os"), Some(&text("UBUNTU_64")));
    assert_eq!(db.get("tools_status"), Some(&text("guestToolsNotRunning")));
    assert!(!db.contains("ip_address"));

    assert_eq!(mock.logins.load(Ordering::SeqCst), 1);
    assert_eq!(mock.logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_credentials_abort_cycle() {
    let mock = Arc::new(MockVcenter::default());
    let url = spawn_mock(mock.clone()).await;
    let store = Arc::new(StatsStore::new());
    let poller = Poller::new(
        Arc::new(VsphereClient::new()),
        endpoint(&url, "wrong"),
        store.clone(),
    );

    let report = poller.update().await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind(), "connection");
    assert!(report.refreshed.is_empty());

    let snapshot = store.snapshot_all().await;
    assert!(snapshot.hosts.records.is_empty());
    assert!(snapshot.hosts.refreshed_at.is_none());
    assert_eq!(mock.logins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_datastore_outage_isolated() {
    let mock = Arc::new(MockVcenter::default());
    mock.fail_datastores.store(true, Ordering::SeqCst);
    let url = spawn_mock(mock.clone()).await;
    let store = Arc::new(StatsStore::new());
    let poller = Poller::new(
        Arc::new(VsphereClient::new()),
        endpoint(&url, "secret"),
        store.clone(),
    );

    let report = poller.update().await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind(), "enumeration");
    assert_eq!(report.errors[0].category(), Some(Category::Datastores));
    assert!(report.refreshed(Category::Hosts));
    assert!(report.refreshed(Category::Vms));

    assert!(store.snapshot(Category::Datastores).await.records.is_empty());
    assert_eq!(store.snapshot(Category::Vms).await.records.len(), 2);
    assert_eq!(mock.logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_views_tracked_per_connection() {
    let mock = Arc::new(MockVcenter::default());
    let url = spawn_mock(mock).await;
    let endpoint = endpoint(&url, "secret");
    let client = VsphereClient::new();
    assert_eq!(client.client_type(), "vsphere-rest");

    let mut connection: Box<dyn Connection> = client.connect(&endpoint).await.unwrap();
    let view = connection.enumerate(Category::Hosts).await.unwrap();
    assert_eq!(view.category, Category::Hosts);
    assert_eq!(view.objects.len(), 2);
    assert_eq!(view.objects[0].id, "host-1");

    let handle = view.handle.clone();
    connection.release(view.handle).await.unwrap();
    assert!(connection.release(handle).await.is_err());

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_slow_placement_bounded_on_its_own() {
    let mock = Arc::new(MockVcenter::default());
    // Two hosts at 700ms each outlast the one second budget
    mock.placement_delay_ms.store(700, Ordering::SeqCst);
    let url = spawn_mock(mock.clone()).await;
    let store = Arc::new(StatsStore::new());
    let mut endpoint = endpoint(&url, "secret");
    endpoint.timeout = 1;
    let poller = Poller::new(Arc::new(VsphereClient::new()), endpoint, store.clone());

    let report = poller.update().await.unwrap();
    assert_eq!(
        report.errors,
        vec![PollError::Timeout {
            operation: "prepare".to_string(),
            category: None,
            after: Duration::from_secs(1),
        }]
    );
    assert!(report.refreshed(Category::Hosts));
    assert!(report.refreshed(Category::Datastores));
    assert!(report.refreshed(Category::Vms));

    // Placement stays empty for the rest of the cycle instead of reloading
    let esxi01 = store.get(Category::Hosts, "esxi_01").await.unwrap();
    assert_eq!(esxi01.get("power_state"), Some(&text("poweredOn")));
    assert!(!esxi01.contains("vm_count"));

    let web = store.get(Category::Vms, "web_01").await.unwrap();
    assert_eq!(web.get("power_state"), Some(&text("poweredOn")));
    assert!(!web.contains("host"));
    assert_eq!(store.snapshot(Category::Vms).await.records.len(), 2);
    assert_eq!(mock.logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_placement_skipped_without_hosts_or_vms() {
    let mock = Arc::new(MockVcenter::default());
    mock.placement_delay_ms.store(5_000, Ordering::SeqCst);
    let url = spawn_mock(mock).await;
    let endpoint = EndpointConfig::new(&url, "monitor", "secret")
        .with_monitored([Category::Datastores]);

    let mut connection = VsphereClient::new().connect(&endpoint).await.unwrap();
    let prepared = tokio::time::timeout(
        Duration::from_secs(1),
        connection.prepare(&endpoint.monitored_conditions),
    )
    .await;
    assert!(matches!(prepared, Ok(Ok(()))));
    connection.close().await.unwrap();
}
