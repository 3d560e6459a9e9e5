//! Field parsers turning raw environment strings into typed settings.

use std::net::IpAddr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Parse a TCP port in `1..=65535`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer or
/// falls outside the valid range.
pub fn parse_port(field: &'static str, raw: &str) -> ConfigResult<u16> {
    let port: u32 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, "must be an integer", raw))?;
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::invalid(
            field,
            "must be between 1 and 65535",
            raw,
        )),
    }
}

/// Parse an IPv4 or IPv6 bind address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an IP address.
pub fn parse_bind_addr(field: &'static str, raw: &str) -> ConfigResult<IpAddr> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, "must be an IP address", raw))
}

/// Normalise the mount route: leading slash required, trailing slashes trimmed.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the route does not start with
/// `/`, contains whitespace, or collapses to the root.
pub fn normalize_route(field: &'static str, raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return Err(ConfigError::invalid(field, "must start with '/'", raw));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(
            field,
            "must not contain whitespace",
            raw,
        ));
    }
    let route = trimmed.trim_end_matches('/');
    if route.is_empty() {
        return Err(ConfigError::invalid(
            field,
            "must not be the root path",
            raw,
        ));
    }
    Ok(route.to_string())
}

/// Parse `code=Name` pairs separated by `;` (or newlines).
///
/// Empty segments are skipped.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when a segment lacks `=` or has an
/// empty code or name.
pub fn parse_language_names(field: &'static str, raw: &str) -> ConfigResult<Vec<(String, String)>> {
    raw.split([';', '\n'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (code, name) = segment
                .split_once('=')
                .ok_or_else(|| ConfigError::invalid(field, "expected code=Name", segment))?;
            let (code, name) = (code.trim(), name.trim());
            if code.is_empty() || name.is_empty() {
                return Err(ConfigError::invalid(
                    field,
                    "code and name must be non-empty",
                    segment,
                ));
            }
            Ok((code.to_string(), name.to_string()))
        })
        .collect()
}

/// Parse the watcher poll interval in milliseconds; `0` disables watching.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a non-negative integer.
pub fn parse_watch_interval(field: &'static str, raw: &str) -> ConfigResult<Option<Duration>> {
    let millis: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, "must be a non-negative integer", raw))?;
    Ok((millis > 0).then(|| Duration::from_millis(millis)))
}
