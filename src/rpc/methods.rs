// Methods RPC - JSON-RPC method implementations
use crate::contracts::{GovParamContract, GovParamError, ParamError};
use crate::node::service::{resolve_read_height, ServiceError};
use crate::rpc::types::*;
use crate::storage::StateBackend;
use crate::types::*;
use tracing::{debug, warn};

/// Nom annoncé par `system_name`
pub const NODE_NAME: &str = "GovParam Node";

// =============================================================================
// RPC METHODS
// =============================================================================

/// RPC method handler over the persisted store
///
/// Each request loads the store and the head from storage, so commits and
/// head moves made by the CLI are visible to the next request. Reads resolve
/// pending changes on that private copy only.
#[derive(Clone)]
pub struct RpcMethods {
    state: StateBackend,
}

impl RpcMethods {
    pub fn new(state: StateBackend) -> Self {
        Self { state }
    }

    /// Current store and head
    fn view(&self) -> Result<(GovParamContract, BlockNumber), JsonRpcError> {
        self.state.load_view().map_err(|e| {
            warn!("RPC cannot load the store: {}", e);
            JsonRpcError::internal_error(&e.to_string())
        })
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("Invalid JSON-RPC version"),
            );
        }

        debug!("RPC request: {}", request.method);

        match request.method.as_str() {
            // Parameter methods
            "govparam_getParam" => self.get_param(request.id, request.params).await,
            "govparam_getAllParams" => self.get_all_params(request.id, request.params).await,
            "govparam_scheduledChanges" => self.scheduled_changes(request.id, request.params).await,

            // Validator / access methods
            "govparam_getValidators" => self.get_validators(request.id).await,
            "govparam_owner" => self.owner(request.id).await,
            "govparam_voteContract" => self.vote_contract(request.id).await,

            // System methods
            "system_version" => JsonRpcResponse::success(request.id, env!("CARGO_PKG_VERSION")),
            "system_name" => JsonRpcResponse::success(request.id, NODE_NAME),

            // Unknown method
            _ => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method)),
        }
    }

    // =========================================================================
    // PARAMETER METHODS
    // =========================================================================

    /// `[id, height?]`
    async fn get_param(&self, id: JsonRpcId, params: serde_json::Value) -> JsonRpcResponse {
        let args = positional(params);

        let param_id = match args.first().and_then(|v| v.as_u64()) {
            Some(n) => match ParamId::try_from(n) {
                Ok(param_id) => param_id,
                Err(_) => {
                    return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Parameter id out of range"))
                }
            },
            None => return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Expected [id, height?]")),
        };
        let (mut store, head) = match self.view() {
            Ok(view) => view,
            Err(e) => return JsonRpcResponse::error(id, e),
        };
        let height = match height_arg(head, args.get(1)) {
            Ok(h) => h,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        if let Err(e) = store.get_param(param_id, height) {
            return JsonRpcResponse::error(id, store_error(e));
        }
        match store.param(param_id) {
            Some(param) => JsonRpcResponse::success(id, ParamInfo::from_param(param, height)),
            None => JsonRpcResponse::error(id, JsonRpcError::param_not_found(param_id)),
        }
    }

    /// `[height?]`
    async fn get_all_params(&self, id: JsonRpcId, params: serde_json::Value) -> JsonRpcResponse {
        let args = positional(params);
        let (mut store, head) = match self.view() {
            Ok(view) => view,
            Err(e) => return JsonRpcResponse::error(id, e),
        };
        let height = match height_arg(head, args.first()) {
            Ok(h) => h,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        let entries: Vec<ParamEntry> = store
            .get_all_params(height)
            .into_iter()
            .map(|(name, value)| ParamEntry { name, value })
            .collect();
        JsonRpcResponse::success(id, entries)
    }

    /// `[height?]`
    async fn scheduled_changes(&self, id: JsonRpcId, params: serde_json::Value) -> JsonRpcResponse {
        let args = positional(params);
        let (store, head) = match self.view() {
            Ok(view) => view,
            Err(e) => return JsonRpcResponse::error(id, e),
        };
        let height = match height_arg(head, args.first()) {
            Ok(h) => h,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        JsonRpcResponse::success(id, store.scheduled_changes(height))
    }

    // =========================================================================
    // VALIDATOR / ACCESS METHODS
    // =========================================================================

    async fn get_validators(&self, id: JsonRpcId) -> JsonRpcResponse {
        match self.view() {
            Ok((store, _)) => JsonRpcResponse::success(id, store.get_validators()),
            Err(e) => JsonRpcResponse::error(id, e),
        }
    }

    async fn owner(&self, id: JsonRpcId) -> JsonRpcResponse {
        match self.view() {
            Ok((store, _)) => JsonRpcResponse::success(id, store.owner()),
            Err(e) => JsonRpcResponse::error(id, e),
        }
    }

    async fn vote_contract(&self, id: JsonRpcId) -> JsonRpcResponse {
        match self.view() {
            Ok((store, _)) => JsonRpcResponse::success(id, store.vote_contract()),
            Err(e) => JsonRpcResponse::error(id, e),
        }
    }

    // =========================================================================
    // HEALTH
    // =========================================================================

    pub async fn health(&self) -> Result<HealthStatus, JsonRpcError> {
        let (store, head) = self.view()?;
        Ok(HealthStatus {
            status: "ok".to_string(),
            head,
            param_count: store.param_count(),
            validator_count: store.get_validators().len(),
        })
    }
}

/// Requested height, or the head when omitted
fn height_arg(head: BlockNumber, arg: Option<&serde_json::Value>) -> Result<BlockNumber, JsonRpcError> {
    let requested = match arg {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(
            value
                .as_u64()
                .ok_or_else(|| JsonRpcError::invalid_params("Expected block height"))?,
        ),
    };

    resolve_read_height(head, requested).map_err(|e| match e {
        ServiceError::HeightBelowHead { requested, head } => {
            JsonRpcError::height_below_head(requested, head)
        }
        other => JsonRpcError::internal_error(&other.to_string()),
    })
}

/// Params may be omitted, a single value, or an array
fn positional(params: serde_json::Value) -> Vec<serde_json::Value> {
    match params {
        serde_json::Value::Array(arr) => arr,
        serde_json::Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn store_error(error: GovParamError) -> JsonRpcError {
    match error {
        GovParamError::Param(ParamError::NoSuchParam(param_id)) => {
            JsonRpcError::param_not_found(param_id)
        }
        other => JsonRpcError::internal_error(&other.to_string()),
    }
}
