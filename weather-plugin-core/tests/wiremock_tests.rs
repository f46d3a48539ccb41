//! Fetcher behaviour against a mock HTTP server.

use std::time::Duration;

use weather_plugin_core::{FetchError, FetcherConfig, SuyanClient, WeatherSource, parse};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const BODY: &str = "01. 城市名：北京\n02. 实时天气：晴\n03. 实时气温：25℃\n04. 更新时间：12:00\n`#img=http://x`";

fn client_for(endpoint: String, timeout: Duration) -> SuyanClient {
    let config = FetcherConfig { endpoint, timeout, ..Default::default() };
    #[allow(clippy::expect_used)]
    SuyanClient::new(config).expect("Failed to create client")
}

async fn mock_api(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/xztq.php"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn endpoint(server: &MockServer) -> String {
    format!("{}/api/xztq.php", server.uri())
}

#[tokio::test]
async fn ok_response_returns_body_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/xztq.php"))
        .and(query_param("msg", "北京"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(endpoint(&server), Duration::from_secs(5));
    let raw = client.fetch("北京").await.expect("fetch should succeed");

    assert_eq!(raw.status, 200);
    assert_eq!(raw.body, BODY);
    assert_eq!(parse(&raw.body).map(|f| f.len()), Some(4));
}

#[tokio::test]
async fn forbidden_maps_to_table_reason() {
    let server = mock_api(403, "nope").await;
    let client = client_for(endpoint(&server), Duration::from_secs(5));

    let err = client.fetch("北京").await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Http { status: 403, reason: "请求被服务器拒绝！".to_string() }
    );
    assert_eq!(err.status_code(), Some(403));
}

#[tokio::test]
async fn service_unavailable_maps_to_maintenance() {
    let server = mock_api(503, "").await;
    let client = client_for(endpoint(&server), Duration::from_secs(5));

    let err = client.fetch("北京").await.unwrap_err();
    assert_eq!(err.to_string(), "系统维护中！");
}

#[tokio::test]
async fn unlisted_status_reports_code() {
    let server = mock_api(404, "not found").await;
    let client = client_for(endpoint(&server), Duration::from_secs(5));

    let err = client.fetch("北京").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.to_string(), "未知错误: 404");
}

#[tokio::test]
async fn non_200_success_is_still_a_failure() {
    let server = mock_api(204, "").await;
    let client = client_for(endpoint(&server), Duration::from_secs(5));

    let err = client.fetch("北京").await.unwrap_err();
    assert_eq!(err.status_code(), Some(204));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(BODY)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_for(endpoint(&server), Duration::from_millis(200));
    let err = client.fetch("北京").await.unwrap_err();

    assert_eq!(err, FetchError::Timeout);
    assert_eq!(err.status_code(), None);
    assert_eq!(err.to_string(), "请求超时，请稍后重试");
}

#[tokio::test]
async fn refused_connection_is_transport_failure() {
    let port = {
        #[allow(clippy::expect_used)]
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        #[allow(clippy::expect_used)]
        listener.local_addr().expect("addr").port()
    };

    let client = client_for(format!("http://127.0.0.1:{port}/api/xztq.php"), Duration::from_secs(5));
    let err = client.fetch("北京").await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    assert!(err.to_string().starts_with("网络请求异常: "));
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn malformed_endpoint_is_unknown_failure() {
    let client = client_for("not a url".to_string(), Duration::from_secs(5));
    let err = client.fetch("北京").await.unwrap_err();

    assert!(matches!(err, FetchError::Unknown(_)), "got {err:?}");
    assert!(err.to_string().starts_with("未知错误: "));
}
