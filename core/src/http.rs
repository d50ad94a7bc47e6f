//! HTTP transport types and the blocking `ureq` transport.
//!
//! # Design
//! `RequestExecutor` describes each request as an `HttpRequest` value and
//! consumes an `HttpResponse` value; the `Transport` trait is the only place
//! that touches the network. Tests and callers with their own HTTP stack
//! plug in at that seam. Every request this SDK makes is a GET, so the
//! request type carries a URL, headers and the two per-request transport
//! switches instead of a method and body.
//!
//! All fields use owned types (`String`, `Vec`) so values can be stored and
//! replayed without lifetime concerns.

use std::time::Duration;

use log::debug;

use crate::error::ApiError;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Follow 3xx responses. Off for the quarry host.
    pub follow_redirects: bool,
    /// Verify the server certificate and host name.
    pub verify_tls: bool,
}

impl HttpRequest {
    pub fn get(url: String) -> Self {
        Self {
            url,
            headers: Vec::new(),
            follow_redirects: true,
            verify_tls: true,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes an `HttpRequest`.
///
/// Non-2xx statuses are responses, not errors; only failures to obtain a
/// response at all are reported as `Err`, as `ApiError::Transport`.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by `ureq`. Builds a fresh agent per request,
/// so no connection is reused between calls.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn config(&self, request: &HttpRequest) -> ureq::config::Config {
        let mut config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout);
        if !request.follow_redirects {
            config = config.max_redirects(0);
        }
        if !request.verify_tls {
            config = config.tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(true)
                    .build(),
            );
        }
        config.build()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!("GET {}", request.url);
        let agent = self.config(request).new_agent();
        let mut call = agent.get(&request.url);
        for (name, value) in &request.headers {
            call = call.header(name.as_str(), value.as_str());
        }
        let mut response = call
            .call()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_defaults_are_safe() {
        let req = HttpRequest::get("http://api.dol.gov/V1/x?".to_string());
        assert!(req.follow_redirects);
        assert!(req.verify_tls);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut req = HttpRequest::get("http://localhost".to_string());
        req.headers.push(("X-API-KEY".to_string(), "k".to_string()));
        assert_eq!(req.header("x-api-key"), Some("k"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn default_config_verifies_and_redirects() {
        let req = HttpRequest::get("https://quarry.dol.gov/data/t1".to_string());
        let config = UreqTransport::default().config(&req);
        assert!(!config.tls_config().disable_verification());
        assert!(config.max_redirects() > 0);
        assert!(!config.http_status_as_error());
    }

    #[test]
    fn insecure_request_disables_verification() {
        let mut req = HttpRequest::get("https://quarry.dol.gov/data/t1".to_string());
        req.verify_tls = false;
        req.follow_redirects = false;
        let config = UreqTransport::default().config(&req);
        assert!(config.tls_config().disable_verification());
        assert_eq!(config.max_redirects(), 0);
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = UreqTransport::new(Some(Duration::from_secs(2)));
        let err = transport
            .send(&HttpRequest::get(format!("http://127.0.0.1:{port}/")))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
