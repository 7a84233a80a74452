use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

/// Reject requests whose Host is not in the allowed list.
pub async fn allowed_hosts_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_owned()))
        .unwrap_or_default();

    if !host_is_allowed(&host, &state.allowed_hosts) {
        tracing::warn!("Rejected request with disallowed host '{}'", host);
        return Err(ApiError::invalid_host(&host));
    }

    Ok(next.run(request).await)
}

/// Match a raw Host value against allowed patterns: `*` matches anything,
/// a leading `.` matches the domain and all of its subdomains, anything
/// else must match exactly (case-insensitive, port ignored).
pub fn host_is_allowed(raw_host: &str, allowed: &[String]) -> bool {
    if allowed.iter().any(|pattern| pattern == "*") {
        return true;
    }

    let domain = match split_domain(raw_host) {
        Some(domain) => domain,
        None => return false,
    };

    allowed.iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        match pattern.strip_prefix('.') {
            Some(parent) => domain == parent || domain.ends_with(&pattern),
            None => domain == pattern,
        }
    })
}

/// Lower-cased domain of a Host value without port or trailing dot.
fn split_domain(raw_host: &str) -> Option<String> {
    let host = raw_host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }

    let domain = if host.starts_with('[') {
        let end = host.find(']')?;
        let rest = &host[end + 1..];
        if !rest.is_empty() && !valid_port(rest.strip_prefix(':')?) {
            return None;
        }
        host[..=end].to_string()
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) => {
                if !valid_port(port) {
                    return None;
                }
                name.to_string()
            }
            None => host,
        }
    };

    let domain = domain.strip_suffix('.').unwrap_or(&domain).to_string();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

fn valid_port(port: &str) -> bool {
    !port.is_empty() && port.len() <= 5 && port.bytes().all(|b| b.is_ascii_digit())
}
