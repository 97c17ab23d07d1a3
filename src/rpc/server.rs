// Server RPC - Read-only JSON-RPC HTTP server using warp
//
// Requests read the store through a read-only storage view. Nothing here
// writes to disk: mutations go through the CLI and the transaction service.

use crate::rpc::methods::RpcMethods;
use crate::rpc::types::JsonRpcRequest;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tracing::{debug, info};
use warp::http::StatusCode;
use warp::Filter;

// =============================================================================
// RPC SERVER
// =============================================================================

/// JSON-RPC HTTP Server
pub struct RpcServer {
    /// Listen port
    port: u16,
    /// Listen address
    address: [u8; 4],
    /// Allowed CORS origins (empty = localhost only)
    allowed_origins: Vec<String>,
}

impl RpcServer {
    /// Create a new RPC server
    pub fn new(port: u16) -> Self {
        Self {
            port,
            address: [127, 0, 0, 1], // Default: localhost only
            allowed_origins: vec![],
        }
    }

    pub fn from_config(config: &RpcConfig) -> Self {
        Self {
            port: config.port,
            address: config.address,
            allowed_origins: config.cors_origins.clone(),
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.address, self.port))
    }

    /// CORS filter: only the listed origins, or localhost if none are listed
    fn build_cors_filter(&self) -> warp::cors::Builder {
        let mut cors = warp::cors()
            .allow_methods(vec!["GET", "POST", "OPTIONS"])
            .allow_headers(vec!["Content-Type", "Accept"]);

        if self.allowed_origins.is_empty() {
            cors = cors
                .allow_origin("http://localhost")
                .allow_origin("http://127.0.0.1")
                .allow_origin("http://localhost:3000")
                .allow_origin("http://127.0.0.1:3000");
            info!("CORS: Restricted to localhost only");
        } else {
            for origin in &self.allowed_origins {
                cors = cors.allow_origin(origin.as_str());
            }
            info!("CORS: Allowed origins: {:?}", self.allowed_origins);
        }

        cors
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, methods: RpcMethods, shutdown: F) -> Result<(), RpcServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.socket_addr();
        info!("Starting RPC server on {}", addr);

        let routes = routes(methods).with(self.build_cors_filter()).with(warp::log("rpc"));

        let (bound_addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .map_err(|e| RpcServerError::BindError(e.to_string()))?;

        info!("RPC server ready on http://{}", bound_addr);
        server.await;
        info!("RPC server stopped");

        Ok(())
    }
}

/// `POST /` for JSON-RPC, `GET /health` for probes
pub fn routes(
    methods: RpcMethods,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let rpc = warp::path::end()
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_REQUEST_SIZE))
        .and(warp::body::json())
        .and(with_methods(methods.clone()))
        .and_then(handle_rpc_request);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_methods(methods))
        .and_then(handle_health_check);

    rpc.or(health)
}

/// Les requêtes sont petites: un id et une hauteur au plus
const MAX_REQUEST_SIZE: u64 = 64 * 1024;

// =============================================================================
// REQUEST HANDLERS
// =============================================================================

/// Filter to inject the method table into handlers
fn with_methods(
    methods: RpcMethods,
) -> impl Filter<Extract = (RpcMethods,), Error = Infallible> + Clone {
    warp::any().map(move || methods.clone())
}

async fn handle_rpc_request(
    request: JsonRpcRequest,
    methods: RpcMethods,
) -> Result<impl warp::Reply, Infallible> {
    debug!("RPC request: {}", request.method);
    let response = methods.handle_request(request).await;
    Ok(warp::reply::json(&response))
}

async fn handle_health_check(methods: RpcMethods) -> Result<impl warp::Reply, Infallible> {
    let reply = match methods.health().await {
        Ok(status) => warp::reply::with_status(warp::reply::json(&status), StatusCode::OK),
        Err(e) => warp::reply::with_status(warp::reply::json(&e), StatusCode::SERVICE_UNAVAILABLE),
    };
    Ok(reply)
}

/// RPC server errors
#[derive(Debug, thiserror::Error)]
pub enum RpcServerError {
    #[error("Bind error: {0}")]
    BindError(String),
}

// =============================================================================
// RPC CONFIG
// =============================================================================

/// RPC server configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Listen port
    pub port: u16,
    /// Listen address (0.0.0.0 for all interfaces)
    pub address: [u8; 4],
    /// Allowed CORS origins (empty = localhost only)
    pub cors_origins: Vec<String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            port: 9944,
            address: [127, 0, 0, 1], // localhost only by default
            cors_origins: vec![],
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
