// RPC - Read-only JSON-RPC API over the parameter store

pub mod methods;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use methods::RpcMethods;
pub use server::{RpcConfig, RpcServer, RpcServerError};
pub use types::{
    HealthStatus, JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse, ParamEntry,
    ParamInfo,
};
