// CLI Configuration - Convert CLI args to node config
// Principle: Clear mapping between user input and internal configuration

use crate::cli::{CallerArgs, ServeCmd};
use crate::rpc::RpcConfig;
use crate::types::AccountId;
use ed25519_dalek::SigningKey;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default data directory name under the home directory
const DEFAULT_DIR: &str = ".govparam";

/// Configuration of the `serve` command
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Base data path
    pub base_path: PathBuf,
    /// RPC configuration
    pub rpc: RpcConfig,
}

impl NodeConfig {
    /// Create configuration from CLI serve command
    pub fn from_serve_cmd(base_path: PathBuf, cmd: &ServeCmd) -> Result<Self, ConfigError> {
        let address = match cmd.rpc_addr.as_str() {
            "127.0.0.1" | "localhost" => [127, 0, 0, 1],
            "0.0.0.0" => [0, 0, 0, 0],
            addr => parse_ip_addr(addr)?,
        };

        for origin in &cmd.rpc_cors {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(ConfigError::InvalidCorsOrigin(origin.clone()));
            }
        }

        Ok(Self {
            base_path,
            rpc: RpcConfig {
                port: cmd.rpc_port,
                address,
                cors_origins: cmd.rpc_cors.clone(),
            },
        })
    }
}

/// Base path from the CLI, or `~/.govparam`
pub fn resolve_base_path(base_path: Option<&Path>) -> PathBuf {
    match base_path {
        Some(path) => path.to_path_buf(),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR),
    }
}

impl CallerArgs {
    /// Account of the caller, from `--caller` or `--caller-key`
    pub fn resolve(&self) -> Result<AccountId, ConfigError> {
        if let Some(account) = self.caller {
            return Ok(account);
        }
        match &self.caller_key {
            Some(path) => load_account_from_key(path),
            None => Err(ConfigError::MissingCaller),
        }
    }
}

/// Account id from a key file
///
/// Accepts the JSON written by `key generate` (`secretKey`, else `publicKey`)
/// or a raw hex secret key.
pub fn load_account_from_key(key_path: &Path) -> Result<AccountId, ConfigError> {
    let content = std::fs::read_to_string(key_path)
        .map_err(|e| ConfigError::KeyLoadError(format!("Failed to read key file: {}", e)))?;

    // Try to parse as JSON
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) {
        if let Some(secret_hex) = json.get("secretKey").and_then(|v| v.as_str()) {
            let signing_key = SigningKey::from_bytes(&decode_key(secret_hex)?);
            let account = AccountId::from_public_key(&signing_key.verifying_key());
            debug!("Caller {} loaded from {}", account, key_path.display());
            return Ok(account);
        }

        // Try publicKey field if secretKey not available
        if let Some(public_hex) = json.get("publicKey").and_then(|v| v.as_str()) {
            return Ok(AccountId::from_bytes(decode_key(public_hex)?));
        }

        return Err(ConfigError::KeyLoadError(
            "Key file missing 'secretKey' or 'publicKey' field".to_string(),
        ));
    }

    // Try to parse as raw hex
    let signing_key = SigningKey::from_bytes(&decode_key(content.trim())?);
    Ok(AccountId::from_public_key(&signing_key.verifying_key()))
}

fn decode_key(hex_str: &str) -> Result<[u8; 32], ConfigError> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let key_bytes = hex::decode(digits)
        .map_err(|e| ConfigError::KeyLoadError(format!("Invalid hex: {}", e)))?;

    key_bytes.try_into().map_err(|b: Vec<u8>| {
        ConfigError::KeyLoadError(format!("Invalid key length: {} bytes", b.len()))
    })
}

/// Parse IP address string to bytes
fn parse_ip_addr(addr: &str) -> Result<[u8; 4], ConfigError> {
    let parts: Vec<&str> = addr.split('.').collect();
    if parts.len() != 4 {
        return Err(ConfigError::InvalidIpAddress(addr.to_string()));
    }

    let mut bytes = [0u8; 4];
    for (i, part) in parts.iter().enumerate() {
        bytes[i] = part
            .parse()
            .map_err(|_| ConfigError::InvalidIpAddress(addr.to_string()))?;
    }

    Ok(bytes)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No caller: pass --caller or --caller-key")]
    MissingCaller,

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("Key load error: {0}")]
    KeyLoadError(String),
}
