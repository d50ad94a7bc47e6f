use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, sign, MockKeys};
use serde_json::Value;
use tower::ServiceExt;

const TIMESTAMP: &str = "2024-01-02T03:04:05Z";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authorization(version: &str, method: &str, query: &str, keys: &MockKeys) -> String {
    let payload = format!(
        "/{version}/{method}?{query}&Timestamp={TIMESTAMP}&ApiKey={}",
        keys.api_key
    );
    let signature = sign(&keys.shared_secret, &payload);
    format!("Timestamp={TIMESTAMP}&ApiKey={}&Signature={signature}", keys.api_key)
}

/// A correctly signed GET against the `/dol` host.
fn signed_request(method: &str, query: &str) -> Request<String> {
    let keys = MockKeys::default();
    Request::builder()
        .uri(format!("/dol/V1/{method}?{query}"))
        .header(http::header::AUTHORIZATION, authorization("V1", method, query, &keys))
        .header(http::header::ACCEPT, "application/json")
        .body(String::new())
        .unwrap()
}

fn plain_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- signed JSON host ---

#[tokio::test]
async fn dol_results_envelope() {
    let resp = app(MockKeys::default())
        .oneshot(signed_request("Statistics/OES/Occupations", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["d"]["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn dol_plain_array_envelope() {
    let resp = app(MockKeys::default())
        .oneshot(signed_request("FAQ/Topics", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["d"][1]["topic"], "Safety");
}

#[tokio::test]
async fn dol_top_limits_rows() {
    let resp = app(MockKeys::default())
        .oneshot(signed_request("Statistics/OES/Occupations", "$top=1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["d"]["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dol_bad_filter_returns_message() {
    let resp = app(MockKeys::default())
        .oneshot(signed_request("FAQ/Topics", "$filter=bad"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"]["value"], "bad request");
}

#[tokio::test]
async fn dol_unknown_method_is_404() {
    let resp = app(MockKeys::default())
        .oneshot(signed_request("Nope", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"]["value"], "Resource not found");
}

#[tokio::test]
async fn dol_unsigned_request_is_401() {
    let resp = app(MockKeys::default())
        .oneshot(plain_request("/dol/V1/FAQ/Topics?"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dol_tampered_query_is_401() {
    let keys = MockKeys::default();
    let req = Request::builder()
        .uri("/dol/V1/FAQ/Topics?$top=2")
        .header(http::header::AUTHORIZATION, authorization("V1", "FAQ/Topics", "$top=1", &keys))
        .header(http::header::ACCEPT, "application/json")
        .body(String::new())
        .unwrap();
    let resp = app(keys).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"]["value"], "Invalid signature");
}

#[tokio::test]
async fn dol_requires_json_accept() {
    let keys = MockKeys::default();
    let req = Request::builder()
        .uri("/dol/V1/FAQ/Topics?")
        .header(http::header::AUTHORIZATION, authorization("V1", "FAQ/Topics", "", &keys))
        .body(String::new())
        .unwrap();
    let resp = app(keys).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
}

// --- XML host ---

#[tokio::test]
async fn usagov_serves_all_items() {
    let resp = app(MockKeys::default())
        .oneshot(plain_request("/usagov/api/content?"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/xml"
    );
    let body = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    assert_eq!(body.matches("<item ").count(), mock_server::XML_ITEM_COUNT);
}

#[tokio::test]
async fn usagov_honors_top() {
    let resp = app(MockKeys::default())
        .oneshot(plain_request("/usagov/api/content?$top=2"))
        .await
        .unwrap();

    let body = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    assert_eq!(body.matches("<item ").count(), 2);
}

#[tokio::test]
async fn usagov_unknown_method_is_404() {
    let resp = app(MockKeys::default())
        .oneshot(plain_request("/usagov/api/unknown"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- quarry host ---

fn quarry_request(uri: &str, key: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("X-API-KEY", key)
        .body(String::new())
        .unwrap()
}

#[tokio::test]
async fn quarry_echoes_path_filters() {
    let resp = app(MockKeys::default())
        .oneshot(quarry_request("/quarry/data/t1/year/2020/state/CA", "test-key"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["method"], "data");
    assert_eq!(body["table"], "t1");
    assert_eq!(body["filters"]["year"], "2020");
    assert_eq!(body["filters"]["state"], "CA");
}

#[tokio::test]
async fn quarry_table_without_filters() {
    let resp = app(MockKeys::default())
        .oneshot(quarry_request("/quarry/data/t1", "test-key"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["filters"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn quarry_wrong_key_is_401() {
    let resp = app(MockKeys::default())
        .oneshot(quarry_request("/quarry/data/t1", "wrong"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn quarry_redirect_method_redirects() {
    let resp = app(MockKeys::default())
        .oneshot(quarry_request("/quarry/redirect/t1", "test-key"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[http::header::LOCATION], "/quarry/data/moved");
    assert_eq!(body_bytes(resp).await, "moved");
}
