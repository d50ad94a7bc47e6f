//! Local stand-in for the three open-data hosts.
//!
//! Each host lives under its own prefix so one listener can serve all of
//! them:
//!
//! - `/dol`: signed JSON API. Checks the `Authorization` signature and
//!   answers `{"d": ...}` envelopes or `{"error":{"message":{"value":..}}}`.
//! - `/usagov`: XML API, no auth.
//! - `/quarry`: path-parameter API keyed by `X-API-KEY`, returns a JSON
//!   echo of the parsed path as an opaque body.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use hmac::{Hmac, Mac};
use log::{debug, warn};
use serde_json::{json, Value};
use sha1::Sha1;
use tokio::net::TcpListener;

type HmacSha1 = Hmac<Sha1>;

/// Number of items the XML host holds per dataset.
pub const XML_ITEM_COUNT: usize = 12;

/// Credentials the mock accepts.
#[derive(Clone, Debug)]
pub struct MockKeys {
    pub api_key: String,
    pub shared_secret: String,
}

impl Default for MockKeys {
    fn default() -> Self {
        Self {
            api_key: "test-key".to_string(),
            shared_secret: "test-secret".to_string(),
        }
    }
}

type Keys = Arc<MockKeys>;

pub fn app(keys: MockKeys) -> Router {
    Router::new()
        .nest("/dol", dol_api())
        .nest("/usagov", usa_gov())
        .nest("/quarry", quarry())
        .with_state(Arc::new(keys))
}

pub async fn run(listener: TcpListener, keys: MockKeys) -> Result<(), std::io::Error> {
    axum::serve(listener, app(keys)).await
}

/// Lowercase hex HMAC-SHA1, as the real host computes it.
pub fn sign(secret: &str, data: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC can take any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

// ---------------------------------------------------------------------------
// Signed JSON host
// ---------------------------------------------------------------------------

fn dol_api() -> Router<Keys> {
    Router::new().route("/{version}/{*method}", get(dol_dataset))
}

fn dol_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": { "message": { "value": message } } }))).into_response()
}

/// Split `Timestamp=..&ApiKey=..&Signature=..` into its fields.
fn parse_authorization(value: &str) -> Option<(&str, &str, &str)> {
    let fields: HashMap<&str, &str> = value.split('&').filter_map(|pair| pair.split_once('=')).collect();
    Some((
        fields.get("Timestamp").copied()?,
        fields.get("ApiKey").copied()?,
        fields.get("Signature").copied()?,
    ))
}

async fn dol_dataset(
    State(keys): State<Keys>,
    Path((version, method)): Path<(String, String)>,
    RawQuery(raw_query): RawQuery,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_authorization);
    let Some((timestamp, api_key, signature)) = authorization else {
        warn!("rejecting unsigned request for {method}");
        return dol_error(StatusCode::UNAUTHORIZED, "Authorization header missing");
    };
    if api_key != keys.api_key {
        return dol_error(StatusCode::UNAUTHORIZED, "Invalid API key");
    }
    let query = raw_query.unwrap_or_default();
    let payload = format!("/{version}/{method}?{query}&Timestamp={timestamp}&ApiKey={api_key}");
    if sign(&keys.shared_secret, &payload) != signature {
        warn!("rejecting bad signature for {payload}");
        return dol_error(StatusCode::UNAUTHORIZED, "Invalid signature");
    }

    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if !accepts_json {
        return (StatusCode::NOT_ACCEPTABLE, "JSON only").into_response();
    }

    if params.get("$filter").is_some_and(|f| f == "bad") {
        return dol_error(StatusCode::BAD_REQUEST, "bad request");
    }
    let top = params.get("$top").and_then(|t| t.parse::<usize>().ok());
    debug!("serving {version}/{method} top={top:?}");

    match (version.as_str(), method.as_str()) {
        ("V1", "Statistics/OES/Occupations") => {
            let rows: Vec<Value> = occupations().into_iter().take(top.unwrap_or(usize::MAX)).collect();
            Json(json!({ "d": { "results": rows } })).into_response()
        }
        ("V1", "FAQ/Topics") => {
            let rows: Vec<Value> = topics().into_iter().take(top.unwrap_or(usize::MAX)).collect();
            Json(json!({ "d": rows })).into_response()
        }
        ("V1", "Broken") => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        _ => dol_error(StatusCode::NOT_FOUND, "Resource not found"),
    }
}

fn occupations() -> Vec<Value> {
    vec![
        json!({ "code": "11-0000", "title": "Management Occupations" }),
        json!({ "code": "13-0000", "title": "Business and Financial Operations" }),
        json!({ "code": "15-0000", "title": "Computer and Mathematical" }),
    ]
}

fn topics() -> Vec<Value> {
    vec![
        json!({ "id": 1, "topic": "Wages" }),
        json!({ "id": 2, "topic": "Safety" }),
    ]
}

// ---------------------------------------------------------------------------
// XML host
// ---------------------------------------------------------------------------

fn usa_gov() -> Router<Keys> {
    Router::new().route("/{*method}", get(usa_gov_dataset))
}

async fn usa_gov_dataset(
    Path(method): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if method != "api/content" {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    let top = params
        .get("$top")
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(XML_ITEM_COUNT);
    let items: String = (0..XML_ITEM_COUNT.min(top))
        .map(|i| format!("<item id=\"{i}\"><title>Resource {i}</title></item>"))
        .collect();
    let body = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?><results>{items}</results>");
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

// ---------------------------------------------------------------------------
// Quarry host
// ---------------------------------------------------------------------------

fn quarry() -> Router<Keys> {
    Router::new()
        .route("/{method}/{table}", get(quarry_table))
        .route("/{method}/{table}/{*filters}", get(quarry_filtered))
}

async fn quarry_table(
    state: State<Keys>,
    Path((method, table)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    quarry_response(state, method, table, String::new(), headers)
}

async fn quarry_filtered(
    state: State<Keys>,
    Path((method, table, filters)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    quarry_response(state, method, table, filters, headers)
}

fn quarry_response(
    State(keys): State<Keys>,
    method: String,
    table: String,
    filters: String,
    headers: HeaderMap,
) -> Response {
    let key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if key != Some(keys.api_key.as_str()) {
        warn!("rejecting quarry request without a valid key");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    if method == "redirect" {
        return (StatusCode::FOUND, [(header::LOCATION, "/quarry/data/moved")], "moved").into_response();
    }

    let segments: Vec<&str> = filters.split('/').filter(|s| !s.is_empty()).collect();
    let filters: serde_json::Map<String, Value> = segments
        .chunks(2)
        .map(|pair| (pair[0].to_string(), json!(pair.get(1).copied().unwrap_or_default())))
        .collect();
    Json(json!({ "method": method, "table": table, "filters": filters })).into_response()
}
