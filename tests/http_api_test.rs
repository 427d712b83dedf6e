//! HTTP 客户端测试
//!
//! 本地用 axum 起一个返回固定 JSON 的桩服务（TCP 和 unix socket 各一种），
//! 验证请求路径、查询参数和响应映射。
//!
//! `live_docker_lookup` 需要真实的 Docker 守护进程，默认忽略：
//! ```bash
//! DOCKER_DISCOVERY_ENDPOINT=unix:///var/run/docker.sock \
//!   cargo test --test http_api_test -- --ignored
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use flare_discovery_docker::discovery::api::http::{encode_query, encode_query_string};
use flare_discovery_docker::{
    DiscoveryFactory, DockerApi, DockerConnector, DockerDiscoverySettings, ErrorCode,
    HttpDockerConnector, ListParameters, Lookup, ServiceDiscovery,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

const CONTAINERS: &str = r#"[
  {
    "Id": "8dfafdbc3a40",
    "Names": ["/weather_1"],
    "Image": "registry.local/weather:1.4",
    "ImageID": "sha256:9b1f0c",
    "State": "running",
    "Status": "Up 2 minutes",
    "Labels": {"com.docker.compose.service": "weather"},
    "Ports": [{"IP": "0.0.0.0", "PrivatePort": 8558, "PublicPort": 8558, "Type": "tcp"}],
    "NetworkSettings": {
      "Networks": {
        "weather-bridge": {"IPAddress": "10.0.0.5", "Gateway": "10.0.0.1"},
        "monitoring": {"IPAddress": ""}
      }
    }
  },
  {
    "Id": "0c1d2e3f4a5b",
    "Names": ["/postgres_1"],
    "Image": "postgres:16",
    "State": "running",
    "Labels": null,
    "Ports": [],
    "NetworkSettings": {"Networks": {"weather-bridge": {"IPAddress": "10.0.0.9"}}}
  }
]"#;

const TASKS: &str = r#"[
  {"ID": "t1", "Status": {"State": "running"}},
  {"ID": "t2", "Status": {"State": "shutdown"}}
]"#;

const TASK_T1: &str = r#"{
  "ID": "t1",
  "Spec": {"ContainerSpec": {"Image": "registry.local/weather:1.4", "Labels": {"team": "ops"}}},
  "Status": {"State": "running"},
  "NetworksAttachments": [
    {"Network": {"Spec": {"Name": "ingress"}}, "Addresses": ["10.255.0.5/16"]},
    {"Network": {"Spec": {"Name": "weather-overlay"}}, "Addresses": ["10.0.1.5/24"]}
  ]
}"#;

const TASK_T2: &str = r#"{
  "ID": "t2",
  "Spec": {"ContainerSpec": {"Image": "registry.local/weather:1.4"}},
  "Status": {"State": "shutdown"},
  "NetworksAttachments": [
    {"Network": {"Spec": {"Name": "weather-overlay"}}, "Addresses": ["10.0.1.6/24"]}
  ]
}"#;

type Requests = Arc<Mutex<Vec<String>>>;

fn json_response(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn containers() -> Response {
    json_response(StatusCode::OK, CONTAINERS)
}

async fn tasks() -> Response {
    json_response(StatusCode::OK, TASKS)
}

async fn task(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "t1" => json_response(StatusCode::OK, TASK_T1),
        "t2" => json_response(StatusCode::OK, TASK_T2),
        _ => not_found().await,
    }
}

async fn broken() -> Response {
    json_response(StatusCode::OK, "{not json")
}

async fn not_found() -> Response {
    json_response(StatusCode::NOT_FOUND, r#"{"message": "page not found"}"#)
}

/// 记录每个请求的路径和查询串
async fn record(State(requests): State<Requests>, request: Request, next: Next) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map(|target| target.as_str().to_string())
        .unwrap_or_default();
    requests.lock().unwrap().push(target);
    next.run(request).await
}

fn stub_router(requests: Requests) -> Router {
    Router::new()
        .route("/containers/json", get(containers))
        .route("/tasks", get(tasks))
        .route("/tasks/{id}", get(task))
        .route("/broken/containers/json", get(broken))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(requests, record))
}

/// 启动桩服务，返回端口和收到的请求目标列表
async fn spawn_stub() -> (u16, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let requests = Requests::default();

    let router = stub_router(requests.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (port, requests)
}

/// 在临时 unix socket 上启动桩服务，返回 `unix://` endpoint
#[cfg(unix)]
async fn spawn_unix_stub(name: &str) -> (String, Requests) {
    let path = std::env::temp_dir().join(format!(
        "flare-discovery-{}-{}.sock",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&path);
    let listener = tokio::net::UnixListener::bind(&path).unwrap();
    let requests = Requests::default();

    let router = stub_router(requests.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("unix://{}", path.display()), requests)
}

fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

#[test]
fn test_base_url_schemes() {
    assert_eq!(
        assert_ok!(HttpDockerConnector::base_url("tcp://127.0.0.1:2375")),
        "http://127.0.0.1:2375"
    );
    assert_eq!(
        assert_ok!(HttpDockerConnector::base_url("https://docker.internal:2376/")),
        "https://docker.internal:2376"
    );

    let err = assert_err!(HttpDockerConnector::base_url("unix:///var/run/docker.sock"));
    assert_eq!(err.code(), ErrorCode::EndpointSchemeUnsupported);
    assert_err!(HttpDockerConnector::base_url("tcp://"));
}

#[test]
fn test_encode_query_string() {
    assert_eq!(assert_ok!(encode_query_string(&[])), None);

    let query = vec![
        ("all".to_string(), "true".to_string()),
        ("filters".to_string(), r#"{"label":["a=b"]}"#.to_string()),
    ];
    assert_eq!(
        assert_ok!(encode_query_string(&query)).as_deref(),
        Some("all=true&filters=%7B%22label%22%3A%5B%22a%3Db%22%5D%7D")
    );
}

#[test]
fn test_encode_query() {
    let parameters = ListParameters::new()
        .with("all", Value::Bool(true))
        .with("limit", json!(10))
        .with("filters", json!({"label": ["cluster=weather"]}))
        .with("since", Value::String("abc".to_string()))
        .with("before", Value::Null);

    let mut query = encode_query(&parameters);
    query.sort();

    assert_eq!(
        query,
        vec![
            ("all".to_string(), "true".to_string()),
            ("filters".to_string(), r#"{"label":["cluster=weather"]}"#.to_string()),
            ("limit".to_string(), "10".to_string()),
            ("since".to_string(), "abc".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_list_containers_maps_response() {
    let (port, requests) = spawn_stub().await;
    let api = assert_ok!(
        HttpDockerConnector::new()
            .connect(&format!("tcp://127.0.0.1:{}", port))
            .await
    );

    let containers = assert_ok!(api.list_containers(&ListParameters::containers_default()).await);

    assert_eq!(containers.len(), 2);
    let weather = &containers[0];
    assert_eq!(weather.id, "8dfafdbc3a40");
    assert_eq!(weather.names, vec!["/weather_1".to_string()]);
    assert_eq!(weather.image_id, "sha256:9b1f0c");
    assert!(weather.is_running());
    assert_eq!(
        weather.labels.get("com.docker.compose.service").map(String::as_str),
        Some("weather")
    );
    assert_eq!(weather.ports[0].host_ip, "0.0.0.0");
    assert_eq!(weather.ports[0].host_port, Some(8558));

    let networks = weather.networks.as_ref().unwrap();
    assert_eq!(networks.len(), 2);
    let bridge = networks
        .iter()
        .find(|network| network.network_name == "weather-bridge")
        .unwrap();
    assert_eq!(bridge.addresses, vec!["10.0.0.5".to_string()]);
    let monitoring = networks
        .iter()
        .find(|network| network.network_name == "monitoring")
        .unwrap();
    assert!(monitoring.addresses.is_empty());

    assert!(containers[1].labels.is_empty());

    let seen = requests.lock().unwrap().clone();
    assert_eq!(seen, vec!["/containers/json?all=true".to_string()]);
}

#[tokio::test]
async fn test_task_inspect_maps_response() {
    let (port, _requests) = spawn_stub().await;
    let api = assert_ok!(
        HttpDockerConnector::new()
            .connect(&format!("http://127.0.0.1:{}", port))
            .await
    );

    let tasks = assert_ok!(api.list_tasks(&ListParameters::new()).await);
    let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);

    let task = assert_ok!(api.inspect_task("t1").await);
    assert_eq!(task.image, "registry.local/weather:1.4");
    assert_eq!(task.labels.get("team").map(String::as_str), Some("ops"));
    assert!(task.is_running());
    assert!(task.ports.is_empty());
    let networks = task.networks.as_ref().unwrap();
    assert_eq!(networks[1].network_name, "weather-overlay");
    assert_eq!(networks[1].addresses, vec!["10.0.1.5/24".to_string()]);
}

#[tokio::test]
async fn test_error_status_and_bad_json() {
    let (port, _requests) = spawn_stub().await;
    let api = assert_ok!(
        HttpDockerConnector::new()
            .connect(&format!("http://127.0.0.1:{}", port))
            .await
    );

    let err = assert_err!(api.inspect_task("missing").await);
    assert_eq!(err.code(), ErrorCode::ApiStatusError);
    assert!(err.to_string().contains("404"));

    let broken = assert_ok!(
        HttpDockerConnector::new()
            .connect(&format!("http://127.0.0.1:{}/broken", port))
            .await
    );
    let err = assert_err!(broken.list_containers(&ListParameters::new()).await);
    assert_eq!(err.code(), ErrorCode::DeserializationError);
}

#[tokio::test]
async fn test_container_lookup_over_http() {
    let (port, _requests) = spawn_stub().await;
    let settings = assert_ok!(DockerDiscoverySettings::new(format!("tcp://127.0.0.1:{}", port)))
        .with_ports([8558])
        .with_network_name_filter(Some("weather".to_string()));
    let settings = assert_ok!(
        settings.with_container_filters_str("labels=com.docker.compose.service:weather")
    );
    let discovery = assert_ok!(DiscoveryFactory::create(settings));

    let resolved = discovery
        .lookup(Lookup::from("weather"), Duration::from_secs(5))
        .await;

    assert_eq!(
        resolved.socket_addrs(),
        vec![addr("10.0.0.5:8558")]
    );
}

#[tokio::test]
async fn test_swarm_lookup_over_http() {
    let (port, requests) = spawn_stub().await;
    let settings = assert_ok!(DockerDiscoverySettings::new(format!("tcp://127.0.0.1:{}", port)))
        .with_ports([8558])
        .with_use_swarm(true)
        .with_network_name_filter(Some("weather-overlay".to_string()));
    let discovery = assert_ok!(DiscoveryFactory::create(settings));

    let resolved = discovery
        .lookup(Lookup::from("weather"), Duration::from_secs(5))
        .await;

    assert_eq!(
        resolved.socket_addrs(),
        vec![addr("10.0.1.5:8558")]
    );

    let mut seen = requests.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["/tasks", "/tasks/t1", "/tasks/t2"]);
}

#[tokio::test]
async fn test_unreachable_endpoint_returns_empty() {
    // 先占用再释放端口，得到一个大概率无人监听的地址
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let discovery = assert_ok!(DiscoveryFactory::create_with_defaults(
        format!("tcp://127.0.0.1:{}", port),
        [8558]
    ));
    let resolved = discovery
        .lookup(Lookup::from("weather"), Duration::from_secs(5))
        .await;

    assert!(resolved.is_empty());
}

#[cfg(unix)]
#[test]
fn test_unix_socket_path() {
    use flare_discovery_docker::UnixDockerConnector;

    assert_eq!(
        assert_ok!(UnixDockerConnector::socket_path("unix:///var/run/docker.sock")),
        std::path::PathBuf::from("/var/run/docker.sock")
    );

    let err = assert_err!(UnixDockerConnector::socket_path("unix://"));
    assert_eq!(err.code(), ErrorCode::EndpointSchemeUnsupported);
    assert_err!(UnixDockerConnector::socket_path("tcp://127.0.0.1:2375"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unix_socket_api() {
    use flare_discovery_docker::UnixDockerConnector;

    let (endpoint, requests) = spawn_unix_stub("api").await;
    let api = assert_ok!(UnixDockerConnector::new().connect(&endpoint).await);

    let containers = assert_ok!(api.list_containers(&ListParameters::containers_default()).await);
    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0].names, vec!["/weather_1".to_string()]);

    let task = assert_ok!(api.inspect_task("t1").await);
    assert!(task.is_running());

    let err = assert_err!(api.inspect_task("missing").await);
    assert_eq!(err.code(), ErrorCode::ApiStatusError);

    let seen = requests.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec!["/containers/json?all=true", "/tasks/t1", "/tasks/missing"]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_unix_socket_lookup() {
    let (endpoint, _requests) = spawn_unix_stub("lookup").await;
    let settings = assert_ok!(DockerDiscoverySettings::new(endpoint))
        .with_ports([8558, 25520])
        .with_use_swarm(true)
        .with_network_name_filter(Some("weather-overlay".to_string()));
    let discovery = assert_ok!(DiscoveryFactory::create(settings));

    let resolved = discovery
        .lookup(Lookup::from("weather"), Duration::from_secs(5))
        .await;

    assert_eq!(
        resolved.socket_addrs(),
        vec![addr("10.0.1.5:8558"), addr("10.0.1.5:25520")]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_unix_missing_socket() {
    use flare_discovery_docker::UnixDockerConnector;

    let endpoint = format!(
        "unix://{}",
        std::env::temp_dir()
            .join(format!("flare-discovery-{}-absent.sock", std::process::id()))
            .display()
    );

    let err = assert_err!(UnixDockerConnector::new().connect(&endpoint).await);
    assert_eq!(err.code(), ErrorCode::IoError);
    assert!(err.is_transient());
    assert!(err.to_string().contains("Docker socket"));

    let discovery = assert_ok!(DiscoveryFactory::create_with_defaults(endpoint, [8558]));
    let resolved = discovery
        .lookup(Lookup::from("weather"), Duration::from_secs(5))
        .await;
    assert!(resolved.is_empty());
}

#[tokio::test]
#[ignore]
async fn live_docker_lookup() {
    let endpoint = std::env::var("DOCKER_DISCOVERY_ENDPOINT")
        .unwrap_or_else(|_| "unix:///var/run/docker.sock".to_string());
    let discovery = assert_ok!(DiscoveryFactory::create_with_defaults(endpoint, [8558]));

    let resolved = discovery
        .lookup(Lookup::from("live"), Duration::from_secs(10))
        .await;

    for target in &resolved.addresses {
        assert_eq!(target.port, 8558);
    }
    println!("live lookup: {:?}", resolved.socket_addrs());
}
