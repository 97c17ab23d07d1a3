// GovParam Node - Entry point
// Principle: Parameters change slowly, and only through the owner or a vote

#![allow(dead_code)]

mod cli;
mod consensus;
mod contracts;
mod genesis;
mod node;
mod rpc;
mod storage;
mod types;

#[cfg(test)]
mod tests;

use clap::Parser;
use cli::config::{load_account_from_key, resolve_base_path, NodeConfig};
use cli::runner::{execute, run_rpc};
use cli::{Cli, Commands, KeySubcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use types::AccountId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_filter = if cli.verbose {
        "debug"
    } else {
        &cli.log_level
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let base_path = resolve_base_path(cli.base_path.as_deref());

    match &cli.command {
        Commands::Serve(cmd) => {
            print_banner();

            let config = NodeConfig::from_serve_cmd(base_path, cmd).map_err(|e| {
                error!("Configuration error: {}", e);
                anyhow::anyhow!("Configuration error: {}", e)
            })?;

            if let Err(e) = run_rpc(config).await {
                error!("Node error: {}", e);
                return Err(anyhow::anyhow!("Node error: {}", e));
            }
            info!("Goodbye!");
        }

        Commands::Key(cmd) => match &cmd.subcommand {
            KeySubcommand::Generate { output, format } => {
                generate_key(output.as_ref(), format)?;
            }
            KeySubcommand::Inspect { key } => {
                inspect_key(key)?;
            }
        },

        Commands::Purge(cmd) => {
            if !cmd.yes {
                println!("This will delete all data at: {}", base_path.display());
                println!("Are you sure? [y/N]");

                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            if base_path.exists() {
                std::fs::remove_dir_all(&base_path)?;
                info!("Purged data at: {}", base_path.display());
            } else {
                info!("No data to purge at: {}", base_path.display());
            }
        }

        command => {
            let output = execute(&base_path, command).map_err(|e| {
                error!("{}", e);
                anyhow::anyhow!("{}", e)
            })?;
            println!("{}", output);
        }
    }

    Ok(())
}

/// Print the GovParam banner
fn print_banner() {
    println!(
        r#"
    ╔═══════════════════════════════════════════════╗
    ║   GovParam Node v{:<28} ║
    ║   Governed parameters • Scheduled activation  ║
    ╚═══════════════════════════════════════════════╝
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Generate a new ed25519 keypair
fn generate_key(output: Option<&std::path::PathBuf>, format: &str) -> anyhow::Result<()> {
    use ed25519_dalek::{SigningKey, VerifyingKey};
    use rand::rngs::OsRng;

    info!("Generating ed25519 keypair");

    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key: VerifyingKey = (&signing_key).into();

    let secret_hex = hex::encode(signing_key.to_bytes());
    let public_hex = hex::encode(verifying_key.to_bytes());
    let account_id = AccountId::from_public_key(&verifying_key).to_hex();

    match format {
        "json" => {
            let json = serde_json::json!({
                "scheme": "ed25519",
                "secretKey": format!("0x{}", secret_hex),
                "publicKey": format!("0x{}", public_hex),
                "accountId": account_id,
            });

            let output_str = serde_json::to_string_pretty(&json)?;

            if let Some(path) = output {
                std::fs::write(path, &output_str)?;
                info!("Key saved to: {}", path.display());
            } else {
                println!("{}", output_str);
            }
        }
        "hex" => {
            println!("Secret Key: 0x{}", secret_hex);
            println!("Public Key: 0x{}", public_hex);
            println!("Account ID: {}", account_id);
        }
        _ => {
            return Err(anyhow::anyhow!("Unknown format: {}", format));
        }
    }

    Ok(())
}

/// Inspect a hex secret key or a key file
fn inspect_key(key: &str) -> anyhow::Result<()> {
    use ed25519_dalek::{SigningKey, VerifyingKey};

    let path = std::path::Path::new(key);
    if path.is_file() {
        let account = load_account_from_key(path)?;
        println!("Type: Key file");
        println!("Account ID: {}", account.to_hex());
        return Ok(());
    }

    // Remove 0x prefix if present
    let key_hex = key.strip_prefix("0x").unwrap_or(key);
    let key_bytes = hex::decode(key_hex)?;

    match key_bytes.len() {
        32 => {
            let secret_bytes: [u8; 32] = key_bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("Invalid key length"))?;
            let signing_key = SigningKey::from_bytes(&secret_bytes);
            let verifying_key: VerifyingKey = (&signing_key).into();

            println!("Type: Secret Key");
            println!("Public Key: 0x{}", hex::encode(verifying_key.to_bytes()));
            println!("Account ID: {}", AccountId::from_public_key(&verifying_key).to_hex());
        }
        64 => {
            // Full keypair
            println!("Type: Full Keypair (64 bytes)");
            println!("Secret: 0x{}", hex::encode(&key_bytes[..32]));
            println!("Public: 0x{}", hex::encode(&key_bytes[32..]));
        }
        n => {
            return Err(anyhow::anyhow!(
                "Invalid key length: {} bytes (expected 32 or 64)",
                n
            ));
        }
    }

    Ok(())
}
