//! End-to-end forwarding tests against a mocked upstream.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{any, body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::{client, config_for, start_relay, start_silent_upstream, TOKEN_PATH};

const DETAILS_42: &str = "/api/v2/profile/42/load-student-details";

async fn error_of(res: reqwest::Response) -> (StatusCode, Value) {
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn test_token_missing_fields_never_reach_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    for body in [
        json!({}),
        json!({"email": "1910001"}),
        json!({"password": "pw"}),
        json!({"email": "", "password": "pw"}),
    ] {
        let res = client()
            .post(relay.url("/token/"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let (status, json) = error_of(res).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json, json!({"error": "Email and password are required"}));
    }
}

#[tokio::test]
async fn test_token_forwards_credentials_and_fixed_headers() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_json(json!({"email": "1910001", "password": "enc-pw"})))
        .and(header("origin", "https://irasv1.iub.edu.bd"))
        .and(header("referer", "https://irasv1.iub.edu.bd/"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
        .expect(1)
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .post(relay.url("/token/"))
        .json(&json!({"email": "1910001", "password": "enc-pw"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"access_token": "abc"}));
}

#[tokio::test]
async fn test_token_username_alias_is_sent_as_email() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_json(json!({"email": "1910001", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .post(relay.url("/api/token/"))
        .json(&json!({"username": "1910001", "password": "pw"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_token_success_body_is_byte_identical() {
    let raw = r#"{"success":true,"data":[{"access_token":"xyz","expires_in":3600}],"b":1,"a":2}"#;
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .post(relay.url("/token/"))
        .json(&json!({"email": "a", "password": "b"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), raw);
}

#[tokio::test]
async fn test_token_rejection_hides_upstream_detail() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "wrong password for 1910001"})),
        )
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .post(relay.url("/token/"))
        .json(&json!({"email": "1910001", "password": "nope"}))
        .send()
        .await
        .unwrap();

    let (status, json) = error_of(res).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"error": "Invalid credentials"}));
}

#[tokio::test]
async fn test_token_non_200_success_is_still_an_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"access_token": "abc"})))
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .post(relay.url("/token/"))
        .json(&json!({"email": "a", "password": "b"}))
        .send()
        .await
        .unwrap();

    let (status, json) = error_of(res).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json, json!({"error": "Invalid credentials"}));
}

#[tokio::test]
async fn test_details_missing_token_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .get(relay.url("/student-details/42/"))
        .send()
        .await
        .unwrap();

    let (status, json) = error_of(res).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"error": "Missing access token"}));
}

#[tokio::test]
async fn test_details_forwards_authorization_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DETAILS_42))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Alice"})))
        .expect(1)
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .get(relay.url("/student-details/42/"))
        .header("authorization", "Bearer tok-123")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"name": "Alice"}));

    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].url.path().contains("42"));
}

#[tokio::test]
async fn test_details_forwards_token_without_scheme() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DETAILS_42))
        .and(header("authorization", "raw-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .get(relay.url("/api/student-details/42/"))
        .header("authorization", "raw-token")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_details_upstream_failure_keeps_status() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DETAILS_42))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace"))
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .get(relay.url("/student-details/42/"))
        .header("authorization", "Bearer t")
        .send()
        .await
        .unwrap();

    let (status, json) = error_of(res).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Failed to fetch student details"}));
}

#[tokio::test]
async fn test_upstream_non_json_success_is_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .get(relay.url("/student-details/42/"))
        .header("authorization", "Bearer t")
        .send()
        .await
        .unwrap();

    let (status, json) = error_of(res).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json, json!({"error": "Invalid upstream response"}));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&upstream)
        .await;
    let mut config = config_for(&upstream);
    config.timeouts.upstream_secs = 1;
    config.timeouts.request_secs = 10;
    let relay = start_relay(config).await;

    let res = client()
        .post(relay.url("/token/"))
        .json(&json!({"email": "a", "password": "b"}))
        .send()
        .await
        .unwrap();

    let (status, json) = error_of(res).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json, json!({"error": "Upstream request timed out"}));
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let upstream = MockServer::start().await;
    let mut config = config_for(&upstream);
    config.upstream.student_details_url =
        "http://127.0.0.1:9/api/v2/profile/{student_id}/load-student-details".into();
    let relay = start_relay(config).await;

    let res = client()
        .get(relay.url("/student-details/42/"))
        .header("authorization", "Bearer t")
        .send()
        .await
        .unwrap();

    let (status, json) = error_of(res).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json, json!({"error": "Upstream request failed"}));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&upstream)
        .await;
    let relay = start_relay(config_for(&upstream)).await;

    let res = client()
        .get(relay.url("/student-details/42/"))
        .header("authorization", "Bearer t")
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn test_client_disconnect_aborts_upstream_call() {
    let (silent_addr, upstream_closed) = start_silent_upstream().await;
    let upstream = MockServer::start().await;
    let mut config = config_for(&upstream);
    config.upstream.student_details_url =
        format!("http://{}/api/v2/profile/{{student_id}}/load-student-details", silent_addr);
    let relay = start_relay(config).await;

    let pending = client()
        .get(relay.url("/student-details/42/"))
        .header("authorization", "Bearer t")
        .send();
    assert!(
        tokio::time::timeout(Duration::from_millis(500), pending)
            .await
            .is_err(),
        "silent upstream should keep the request pending"
    );

    // Upstream deadline is 30s; only cancellation closes the connection this early.
    tokio::time::timeout(Duration::from_secs(5), upstream_closed)
        .await
        .expect("upstream call outlived the inbound request")
        .unwrap();
}
