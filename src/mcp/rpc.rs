//! JSON-RPC 2.0 envelopes for the client side
//!
//! Builds request payloads and turns server replies into either the `result`
//! value or an [`AgentError`].

use rust_mcp_sdk::schema::RequestId;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::errors::AgentError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

pub fn json_rpc_request(id: u64, method: &str, params: Option<&Value>) -> Value {
    let mut payload = json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": method,
        "id": request_id_to_value(RequestId::Integer(id as i64)),
    });

    if let (Some(params), Some(object)) = (params, payload.as_object_mut()) {
        object.insert("params".to_string(), params.clone());
    }

    payload
}

/// Decodes a reply body. An `error` member wins over `result`; a reply with
/// neither yields an empty object.
pub fn parse_json_rpc_response(body: &str, expected_id: u64) -> Result<Value, AgentError> {
    let raw: RawResponse =
        serde_json::from_str(body).map_err(|err| AgentError::decode("json-rpc response", err))?;

    if let Some(error) = raw.error {
        return Err(AgentError::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    if let Some(id) = raw.id.as_ref().filter(|id| !id.is_null()) {
        let matches = matches!(
            value_to_request_id(id),
            Some(RequestId::Integer(value)) if value == expected_id as i64
        );
        if !matches {
            return Err(AgentError::unexpected(format!(
                "response id {id} does not match request id {expected_id}"
            )));
        }
    }

    Ok(raw.result.unwrap_or_else(|| Value::Object(Map::new())))
}

pub fn value_to_request_id(value: &Value) -> Option<RequestId> {
    if let Some(string_id) = value.as_str() {
        return string_id
            .parse::<i64>()
            .map(RequestId::Integer)
            .ok()
            .or_else(|| Some(RequestId::String(string_id.to_string())));
    }

    value.as_i64().map(RequestId::Integer)
}

pub fn request_id_to_value(id: RequestId) -> Value {
    match id {
        RequestId::String(value) => Value::String(value),
        RequestId::Integer(value) => Value::Number(value.into()),
    }
}
