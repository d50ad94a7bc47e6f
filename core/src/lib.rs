//! Synchronous client for the DOL and USA.gov open-data APIs.
//!
//! # Overview
//! A `RequestContext` names one of three hosts and carries the credentials
//! for it; a `RequestExecutor` turns a method name plus `QueryArguments` into
//! a request for that host, sends it and normalizes the answer into
//! `Record`s:
//!
//! | host                      | auth                 | response         |
//! |---------------------------|----------------------|------------------|
//! | `http://api.dol.gov`      | HMAC-SHA1 signature  | JSON `d` payload |
//! | `http://business.usa.gov` | none                 | XML document     |
//! | `https://quarry.dol.gov`  | `X-API-KEY` header   | raw body         |
//!
//! # Design
//! - Request building and response parsing are plain functions over
//!   `HttpRequest` / `HttpResponse` values; the `Transport` trait is the
//!   only I/O seam, with `UreqTransport` as the default.
//! - `execute` returns `None` for an unrecognized host and otherwise an
//!   explicit `Result` of records or `ApiError`.
//!
//! ```no_run
//! use govdata_core::{QueryArguments, RequestContext, RequestExecutor};
//!
//! let context = RequestContext::new("http://api.dol.gov", "my-key", "my-secret");
//! let mut executor = RequestExecutor::new(context);
//! let args = QueryArguments::new().with("top", "5");
//! match executor.execute("Statistics/OES/Occupations", &args) {
//!     Some(Ok(records)) => println!("{} records", records.len()),
//!     Some(Err(err)) => eprintln!("{err}"),
//!     None => eprintln!("unsupported host"),
//! }
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod query;
pub mod signing;
pub mod types;

pub use client::{Branch, ExecutorConfig, RequestExecutor};
pub use context::{Host, RequestContext};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{ApiResult, QueryArguments, Record, XmlElement};
