//! Request execution against the three supported hosts.
//!
//! # Design
//! `RequestExecutor` picks a branch from its context (`validate()` first,
//! then the version tag), builds an `HttpRequest` for that branch, sends it
//! through its `Transport` and normalizes the `HttpResponse`. The build and
//! parse halves are public so callers that do their own I/O can drive them
//! directly; `execute` just wires them to the transport.
//!
//! Branch quirks:
//! - primary: signed query-string GET, JSON `d` envelope.
//! - secondary: unsigned query-string GET, XML document, first ten children.
//! - quarry: path-parameter GET with `X-API-KEY`, no redirects, raw body.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;

use crate::context::{Host, RequestContext, VERSION_V2};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::query::{quarry_path, render_query};
use crate::signing::{authorization_header, format_timestamp};
use crate::types::{ApiResult, QueryArguments, Record, XmlElement};

/// Maximum number of records returned from the secondary host.
pub const XML_RECORD_LIMIT: usize = 10;

/// Transport settings for a `RequestExecutor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Verify certificates on quarry requests. The other hosts always verify.
    pub verify_tls: bool,
    /// Overall per-request timeout. `None` waits for the transport.
    pub timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: None,
        }
    }
}

impl ExecutorConfig {
    /// Skip certificate and host-name checks on the quarry host. Only meant
    /// for non-production quarry deployments with self-signed certificates.
    pub fn insecure_skip_tls_verify(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Code path selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Signed JSON requests against the primary API host.
    Primary,
    /// XML requests against the civic-data host.
    Secondary,
    /// Path-parameter requests for contexts carrying the `V2` tag.
    Quarry,
}

/// Builds, sends and parses requests for one `RequestContext`.
#[derive(Debug)]
pub struct RequestExecutor<T = UreqTransport> {
    context: RequestContext,
    config: ExecutorConfig,
    transport: T,
}

impl RequestExecutor<UreqTransport> {
    pub fn new(context: RequestContext) -> Self {
        Self::with_config(context, ExecutorConfig::default())
    }

    pub fn with_config(context: RequestContext, config: ExecutorConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(context, config, transport)
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn with_transport(context: RequestContext, config: ExecutorConfig, transport: T) -> Self {
        Self {
            context,
            config,
            transport,
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Pick the branch for this context, or `None` if no branch applies.
    ///
    /// Goes through `RequestContext::validate`, so a quarry context has its
    /// version tag refreshed on the way.
    pub fn branch(&mut self) -> Option<Branch> {
        let validated = self.context.validate().and_then(Host::from_url);
        match validated {
            Some(Host::DolApi) => Some(Branch::Primary),
            Some(Host::UsaGov) => Some(Branch::Secondary),
            _ if self.context.version_tag() == VERSION_V2 => Some(Branch::Quarry),
            _ => None,
        }
    }

    /// Call `method` with `arguments` and normalize the response.
    ///
    /// Returns `None` when the context's host is not recognized.
    pub fn execute(&mut self, method: &str, arguments: &QueryArguments) -> Option<ApiResult> {
        let Some(branch) = self.branch() else {
            warn!("no branch for host {:?}", self.context.host_url());
            return None;
        };
        debug!("dispatching {method} via {branch:?}");
        Some(self.execute_branch(branch, method, arguments))
    }

    fn execute_branch(&self, branch: Branch, method: &str, arguments: &QueryArguments) -> ApiResult {
        let request = self.build_request(branch, method, arguments, Utc::now())?;
        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!("{method} via {branch:?} failed: {err}");
                return Err(match branch {
                    Branch::Primary => ApiError::ConnectionFailed,
                    Branch::Secondary | Branch::Quarry => err,
                });
            }
        };
        self.parse_response(branch, response)
    }

    /// Build the request `execute` would send for `branch`.
    ///
    /// `now` is the signing time for primary-host requests and is ignored by
    /// the other branches.
    pub fn build_request(
        &self,
        branch: Branch,
        method: &str,
        arguments: &QueryArguments,
        now: DateTime<Utc>,
    ) -> Result<HttpRequest, ApiError> {
        let host = self.context.host_url();
        match branch {
            Branch::Primary => {
                let version = self.context.version_tag();
                let query = render_query(arguments);
                let timestamp = format_timestamp(now);
                let authorization = authorization_header(
                    version,
                    method,
                    &query,
                    &timestamp,
                    self.context.api_key(),
                    self.context.shared_secret(),
                );
                let mut request = HttpRequest::get(format!("{host}/{version}/{method}?{query}"));
                request.headers = vec![
                    ("Authorization".to_string(), authorization),
                    ("Accept".to_string(), "application/json".to_string()),
                ];
                Ok(request)
            }
            Branch::Secondary => {
                let query = render_query(arguments);
                Ok(HttpRequest::get(format!("{host}/{method}?{query}")))
            }
            Branch::Quarry => {
                let mut request = HttpRequest::get(quarry_path(host, method, arguments)?);
                request.headers = vec![("X-API-KEY".to_string(), self.context.api_key().to_string())];
                request.follow_redirects = false;
                request.verify_tls = self.config.verify_tls;
                Ok(request)
            }
        }
    }

    /// Normalize a response received for a `branch` request.
    pub fn parse_response(&self, branch: Branch, response: HttpResponse) -> ApiResult {
        match branch {
            Branch::Primary => parse_json_response(response),
            Branch::Secondary => parse_xml_response(response),
            Branch::Quarry => Ok(vec![Record::Raw(response.body)]),
        }
    }
}

/// Unwrap the primary host's `{"d": ...}` envelope.
///
/// `d.results` replaces `d` when `d` is an object that has it. An array
/// becomes one record per element, `null` no records, anything else a
/// single record.
fn parse_json_response(response: HttpResponse) -> ApiResult {
    if response.status != 200 {
        warn!("primary host answered HTTP {}", response.status);
        return Err(remote_error(&response.body));
    }

    let mut body: Value = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    let mut payload = body
        .get_mut("d")
        .map(Value::take)
        .ok_or_else(|| ApiError::Deserialization("missing `d` field".to_string()))?;
    let results = match &mut payload {
        Value::Object(fields) => fields.remove("results"),
        _ => None,
    };
    if let Some(results) = results {
        payload = results;
    }

    Ok(match payload {
        Value::Array(items) => items.into_iter().map(Record::Json).collect(),
        Value::Null => Vec::new(),
        other => vec![Record::Json(other)],
    })
}

/// `error.message.value` from an error body, or the generic failure.
fn remote_error(body: &str) -> ApiError {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message/value")
                .and_then(|message| match message {
                    Value::Null => None,
                    Value::String(text) => Some(text.clone()),
                    other => Some(other.to_string()),
                })
        })
        .map(ApiError::Remote)
        .unwrap_or(ApiError::ConnectionFailed)
}

fn parse_xml_response(response: HttpResponse) -> ApiResult {
    if !(200..300).contains(&response.status) {
        warn!("civic-data host answered HTTP {}", response.status);
        return Err(ApiError::HttpError {
            status: response.status,
            body: response.body,
        });
    }

    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let document = roxmltree::Document::parse_with_options(&response.body, options)
        .map_err(|e| ApiError::Xml(e.to_string()))?;
    Ok(document
        .root_element()
        .children()
        .filter(|node| node.is_element())
        .take(XML_RECORD_LIMIT)
        .map(|node| Record::Xml(xml_element(node)))
        .collect())
}

fn xml_element(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    XmlElement {
        name: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        text: text.trim().to_string(),
        children: node
            .children()
            .filter(|child| child.is_element())
            .map(xml_element)
            .collect(),
    }
}
