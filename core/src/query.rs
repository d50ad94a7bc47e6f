//! Query-string and path rendering for request arguments.
//!
//! The primary and secondary hosts take OData-style query strings in which a
//! handful of reserved keys carry a `$` prefix. The quarry host takes its
//! arguments as alternating `/{key}/{value}` path segments instead.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ApiError;
use crate::types::QueryArguments;

/// Argument names rendered as `$name` in query strings.
pub const RESERVED_ARGUMENTS: [&str; 5] = ["top", "skip", "select", "orderby", "filter"];

/// Argument holding the quarry table name.
pub const TABLE_ALIAS: &str = "table_alias";

/// Everything except RFC 3986 unreserved characters, so a space becomes `%20`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn is_reserved(key: &str) -> bool {
    RESERVED_ARGUMENTS.iter().any(|reserved| *reserved == key)
}

/// Render `arguments` as `key=value` pairs joined by `&`, in insertion order.
pub fn render_query(arguments: &QueryArguments) -> String {
    arguments
        .iter()
        .map(|(key, value)| {
            let value = utf8_percent_encode(value, COMPONENT);
            if is_reserved(key) {
                format!("${key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Build `{host}/{method}/{table_alias}/{k1}/{v1}/...` for the quarry host.
///
/// Reserved keys get no `$` prefix here. Fails when `method` or the
/// `table_alias` argument is empty. Only the empty string counts as empty:
/// a `table_alias` of `"0"` is accepted.
pub fn quarry_path(host: &str, method: &str, arguments: &QueryArguments) -> Result<String, ApiError> {
    let table = match arguments.get(TABLE_ALIAS) {
        Some(table) if !table.is_empty() && !method.is_empty() => table,
        _ => return Err(ApiError::ImproperInput),
    };

    let mut path = format!("{host}/{method}/{}", utf8_percent_encode(table, COMPONENT));
    for (key, value) in arguments.iter().filter(|(key, _)| *key != TABLE_ALIAS) {
        path.push('/');
        path.extend(utf8_percent_encode(key, COMPONENT));
        path.push('/');
        path.extend(utf8_percent_encode(value, COMPONENT));
    }
    Ok(path)
}
