use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `level` overrides `RUST_LOG` when given.
pub fn init_logging(level: Option<Level>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_str().to_ascii_lowercase()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Maps `-v`/`-q` counts onto a level; `None` leaves `RUST_LOG` in charge.
pub fn level_from_flags(verbose: u8, quiet: bool) -> Option<Level> {
    if quiet {
        return Some(Level::ERROR);
    }
    match verbose {
        0 => None,
        1 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

pub struct Exchange<'a> {
    pub method: &'a str,
    pub id: Option<u64>,
    pub params: Option<&'a Value>,
    pub status: Option<u16>,
    pub elapsed: Duration,
    pub success: bool,
}

pub fn log_exchange(exchange: &Exchange<'_>) {
    let params = redact_audit_params(exchange.params);
    let duration_ms = exchange.elapsed.as_millis();

    info!(
        method = %exchange.method,
        id = ?exchange.id,
        params = %params,
        status = ?exchange.status,
        duration_ms,
        outcome = if exchange.success { "success" } else { "failure" },
        "mcp request summary"
    );

    if is_refused(exchange.status) {
        warn!(method = %exchange.method, status = ?exchange.status, "server refused request");
    }
}

/// Client or server error status on an otherwise delivered request.
fn is_refused(status: Option<u16>) -> bool {
    matches!(status, Some(status) if status >= 400)
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "authorization" | "bearer" | "api_key" | "apikey"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}
