//! Connection context: which host to talk to and with which credentials.
//!
//! # Design
//! Only three hosts are supported and they are recognized by exact string
//! equality, so `"http://api.dol.gov/"` (trailing slash) is not a known host.
//! The API version segment is derived from the host and never set directly:
//! the quarry host speaks `V2`, everything else `V1`.

use std::fmt;

/// Version segment used by the primary host.
pub const VERSION_V1: &str = "V1";
/// Version segment that routes requests down the quarry code path.
pub const VERSION_V2: &str = "V2";

/// One of the hosts this SDK knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// Signed JSON API.
    DolApi,
    /// Unauthenticated XML civic-data API.
    UsaGov,
    /// Path-parameter API keyed by `X-API-KEY`.
    DolQuarry,
}

impl Host {
    pub const ALL: [Host; 3] = [Host::DolApi, Host::UsaGov, Host::DolQuarry];

    pub fn url(self) -> &'static str {
        match self {
            Host::DolApi => "http://api.dol.gov",
            Host::UsaGov => "http://business.usa.gov",
            Host::DolQuarry => "https://quarry.dol.gov",
        }
    }

    pub fn from_url(url: &str) -> Option<Host> {
        Host::ALL.into_iter().find(|host| host.url() == url)
    }
}

/// Host URL, API version and credentials for a `RequestExecutor`.
#[derive(Clone)]
pub struct RequestContext {
    host_url: String,
    api_version: String,
    api_key: String,
    shared_secret: String,
    api_user: Option<String>,
    api_pass: Option<String>,
}

impl RequestContext {
    pub fn new(host_url: &str, api_key: &str, shared_secret: &str) -> Self {
        let mut context = Self {
            host_url: host_url.to_string(),
            api_version: VERSION_V1.to_string(),
            api_key: api_key.to_string(),
            shared_secret: shared_secret.to_string(),
            api_user: None,
            api_pass: None,
        };
        context.refresh_version_tag();
        context
    }

    /// Attach a user/password pair. Carried for callers; no request uses it.
    pub fn with_credentials(mut self, user: &str, pass: &str) -> Self {
        self.api_user = Some(user.to_string());
        self.api_pass = Some(pass.to_string());
        self
    }

    /// Return the host URL if it is one of the known hosts.
    ///
    /// Matching the quarry host also switches the version tag to `V2`.
    pub fn validate(&mut self) -> Option<&str> {
        let host = self.host()?;
        if host == Host::DolQuarry {
            self.api_version = VERSION_V2.to_string();
        }
        Some(&self.host_url)
    }

    pub fn host(&self) -> Option<Host> {
        Host::from_url(&self.host_url)
    }

    pub fn refresh_version_tag(&mut self) {
        if self.host_url == Host::DolQuarry.url() {
            self.api_version = VERSION_V2.to_string();
        }
    }

    pub fn version_tag(&self) -> &str {
        &self.api_version
    }

    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn shared_secret(&self) -> &str {
        &self.shared_secret
    }

    pub fn api_user(&self) -> Option<&str> {
        self.api_user.as_deref()
    }

    pub fn api_pass(&self) -> Option<&str> {
        self.api_pass.as_deref()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("host_url", &self.host_url)
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key)
            .field("shared_secret", &"<redacted>")
            .field("api_user", &self.api_user)
            .field("api_pass", &self.api_pass.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
