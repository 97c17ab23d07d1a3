// Types RPC - Structures for JSON-RPC 2.0 requests and responses
use crate::contracts::Parameter;
use crate::types::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// JSON-RPC 2.0 PROTOCOL TYPES
// =============================================================================

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,

    /// Method name (e.g., "govparam_getParam")
    pub method: String,

    /// Method parameters
    #[serde(default)]
    pub params: serde_json::Value,

    /// Request ID
    pub id: JsonRpcId,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: String,

    /// Result (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Request ID
    pub id: JsonRpcId,
}

impl JsonRpcResponse {
    pub fn success<T: Serialize>(id: JsonRpcId, result: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(serde_json::to_value(result).unwrap_or(serde_json::Value::Null)),
            error: None,
            id,
        }
    }

    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC Request ID (can be string, number, or null)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
    Null,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Invalid request (-32600)
    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: format!("Invalid request: {}", message),
            data: None,
        }
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }

    /// Invalid params (-32602)
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: format!("Invalid params: {}", message),
            data: None,
        }
    }

    /// Internal error (-32603)
    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: format!("Internal error: {}", message),
            data: None,
        }
    }

    /// Parameter not found (-32001)
    pub fn param_not_found(id: ParamId) -> Self {
        Self {
            code: -32001,
            message: "no such parameter".to_string(),
            data: Some(serde_json::json!({ "id": id })),
        }
    }

    /// Height below the served head (-32002)
    pub fn height_below_head(requested: BlockNumber, head: BlockNumber) -> Self {
        Self {
            code: -32002,
            message: format!("Height {} is below the head #{}", requested, head),
            data: Some(serde_json::json!({ "requested": requested, "head": head })),
        }
    }
}

// =============================================================================
// GOVPARAM TYPES
// =============================================================================

/// Effective parameter as returned by `govparam_getParam`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamInfo {
    pub id: ParamId,
    pub name: String,
    pub votable: bool,
    /// Hex-encoded effective value
    pub value: ParamValue,
    /// Height the value was read at
    pub height: BlockNumber,
}

impl ParamInfo {
    pub fn from_param(param: &Parameter, height: BlockNumber) -> Self {
        Self {
            id: param.id,
            name: param.name.clone(),
            votable: param.votable,
            value: param.value_at(height).clone(),
            height,
        }
    }
}

/// Entry of `govparam_getAllParams`, in id order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamEntry {
    pub name: String,
    pub value: ParamValue,
}

/// Health status for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub head: BlockNumber,
    pub param_count: usize,
    pub validator_count: usize,
}
