use std::collections::BTreeMap;
use std::time::Duration;

use playbook_core::types::{HttpReply, HttpRequest};
use playbook_exec::executor::http::{HttpClient, HttpConfig, HttpError, MockHttpClient, ReqwestHttpClient};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get(url: String) -> HttpRequest {
    HttpRequest {
        method: "GET".to_string(),
        url,
        headers: BTreeMap::new(),
        body: None,
    }
}

#[tokio::test]
async fn reqwest_client_sends_request_and_reads_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(query_param("dry", "1"))
        .and(header("x-api-key", "k"))
        .and(body_string(r#"{"name":"bob"}"#))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("location", "/users/7")
                .set_body_string(r#"{"id":7}"#),
        )
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new(HttpConfig::default()).unwrap();
    let req = HttpRequest {
        method: "POST".to_string(),
        url: format!("{}/users?dry=1", server.uri()),
        headers: BTreeMap::from([
            ("X-API-Key".to_string(), "k".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]),
        body: Some(r#"{"name":"bob"}"#.to_string()),
    };

    let HttpReply::Response(resp) = client.send(&req).await.unwrap() else {
        panic!("expected a real response");
    };
    assert_eq!(resp.status_code, 201);
    assert_eq!(resp.header("Location"), Some("/users/7"));
    assert_eq!(resp.body, r#"{"id":7}"#);
}

#[tokio::test]
async fn reqwest_client_does_not_follow_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new(HttpConfig::default()).unwrap();
    let reply = client.send(&get(format!("{}/old", server.uri()))).await.unwrap();
    assert_eq!(reply.response().map(|r| r.status_code), Some(302));
}

#[tokio::test]
async fn reqwest_client_handles_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new(HttpConfig {
        timeout: Duration::from_millis(200),
        ..HttpConfig::default()
    })
    .unwrap();
    let err = client.send(&get(server.uri())).await.unwrap_err();
    assert_eq!(err, HttpError::Timeout);
}

#[tokio::test]
async fn reqwest_client_enforces_response_size_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(1000)))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new(HttpConfig {
        max_response_bytes: 100,
        ..HttpConfig::default()
    })
    .unwrap();
    match client.send(&get(server.uri())).await.unwrap_err() {
        HttpError::ResponseTooLarge { max_bytes } => assert_eq!(max_bytes, 100),
        other => panic!("expected response too large error, got {other:?}"),
    }
}

#[tokio::test]
async fn reqwest_client_reports_connection_errors() {
    let client = ReqwestHttpClient::new(HttpConfig::default()).unwrap();
    let err = client
        .send(&get("http://127.0.0.1:1/unreachable".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn mock_client_returns_sentinel() {
    let reply = MockHttpClient.send(&get("http://nowhere.invalid/".to_string())).await.unwrap();
    assert!(reply.is_mock());
}
