//! Error types for the GOVData client.
//!
//! # Design
//! The `Display` text of each variant is the message callers historically
//! received as a bare string, so `err.to_string()` stays compatible with
//! code that compared against those strings. `Remote` carries the message
//! the primary host put in its error body; everything that never reached a
//! well-formed response lands in `ConnectionFailed` or `Transport`.

use thiserror::Error;

/// Errors returned by `RequestExecutor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A quarry call was missing its method or `table_alias` argument.
    #[error("ERROR: Improper input parameters.")]
    ImproperInput,

    /// The primary host answered non-200 with `error.message.value` set.
    #[error("{0}")]
    Remote(String),

    /// The primary host answered non-200 without a usable message, or the
    /// request never completed.
    #[error("Connection to host failed.")]
    ConnectionFailed,

    /// The secondary host returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The secondary or quarry host could not be reached.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A 200 response from the primary host had no usable `d` payload.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The secondary host returned a body that is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(String),
}
