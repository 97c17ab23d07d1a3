// CLI - Command Line Interface for the GovParam node
// Principle: one command, one call; every mutation names its caller

pub mod config;
pub mod runner;

use crate::types::{AccountId, BlockNumber, GovCall, ParamId, ParamValue};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// GovParam Node - governed network parameters and validator registry
#[derive(Parser, Debug)]
#[command(name = "govparam-node")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Governed network parameters with block-scheduled activation")]
#[command(long_about = r#"
GovParam keeps the network parameters nodes read at each block, and the
validator set consensus runs with.

Parameter changes are scheduled for a future block and take effect once the
chain reaches it. The owner, or the designated vote contract for votable
entries, may schedule changes.

Create a store with the standard parameters:
  govparam-node init --caller-key owner.json

Schedule a change for block 1000:
  govparam-node set-param 5 0xae9f7bcc00 1000 --caller-key owner.json

Serve read-only JSON-RPC:
  govparam-node serve --rpc-port 9944
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Base path for node data
    #[arg(short = 'd', long, global = true, env = "GOVPARAM_BASE_PATH")]
    pub base_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", env = "GOVPARAM_LOG")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store from a genesis file or the standard parameter table
    Init(InitCmd),

    /// Register a new parameter (owner only)
    AddParam {
        #[command(flatten)]
        caller: CallerArgs,

        /// Parameter id
        id: ParamId,

        /// Parameter name (non-empty)
        name: String,

        /// Initial value (hex)
        #[arg(value_parser = parse_param_value)]
        value: ParamValue,

        /// Let the vote contract schedule changes
        #[arg(long)]
        votable: bool,
    },

    /// Schedule a parameter change
    SetParam {
        #[command(flatten)]
        caller: CallerArgs,

        /// Parameter id
        id: ParamId,

        /// New value (hex)
        #[arg(value_parser = parse_param_value)]
        value: ParamValue,

        /// Activation block (strictly after the head)
        activation: BlockNumber,
    },

    /// Change whether a parameter is votable (owner only)
    SetParamVotable {
        #[command(flatten)]
        caller: CallerArgs,

        /// Parameter id
        id: ParamId,

        /// true or false
        #[arg(action = ArgAction::Set)]
        votable: bool,
    },

    /// Add a validator
    AddValidator {
        #[command(flatten)]
        caller: CallerArgs,

        /// Validator account (hex)
        validator: AccountId,
    },

    /// Remove a validator
    RemoveValidator {
        #[command(flatten)]
        caller: CallerArgs,

        /// Validator account (hex)
        validator: AccountId,
    },

    /// Change whether the vote contract may edit the validator set (owner only)
    SetUpdateValsVotable {
        #[command(flatten)]
        caller: CallerArgs,

        /// true or false
        #[arg(action = ArgAction::Set)]
        votable: bool,
    },

    /// Designate the vote contract (owner only)
    SetVoteContract {
        #[command(flatten)]
        caller: CallerArgs,

        /// Vote contract account (hex)
        vote_contract: AccountId,
    },

    /// Hand the store over to a new owner (owner only)
    TransferOwnership {
        #[command(flatten)]
        caller: CallerArgs,

        /// New owner account (hex)
        new_owner: AccountId,
    },

    /// Show the effective value of a parameter
    GetParam {
        /// Parameter id
        id: ParamId,

        /// Read at this height instead of the head
        #[arg(long)]
        at: Option<BlockNumber>,
    },

    /// List all parameters in id order
    Params {
        /// Read at this height instead of the head
        #[arg(long)]
        at: Option<BlockNumber>,
    },

    /// List changes not yet in force
    Scheduled {
        /// Read at this height instead of the head
        #[arg(long)]
        at: Option<BlockNumber>,
    },

    /// List validators in storage order
    Validators,

    /// Show store information
    Info,

    /// Show the event log
    Events {
        /// First sequence number
        #[arg(long, default_value = "0")]
        from: u64,
    },

    /// Move the head forward
    Advance {
        /// Number of blocks
        #[arg(long, default_value = "1")]
        blocks: BlockNumber,
    },

    /// Serve the read-only JSON-RPC API
    Serve(ServeCmd),

    /// Key management
    Key(KeyCmd),

    /// Purge node data
    Purge(PurgeCmd),
}

impl Commands {
    /// The governance call behind a mutating command
    pub fn gov_call(&self) -> Option<(&CallerArgs, GovCall)> {
        let pair = match self {
            Commands::AddParam { caller, id, name, value, votable } => (
                caller,
                GovCall::AddParam {
                    id: *id,
                    name: name.clone(),
                    votable: *votable,
                    value: value.clone(),
                },
            ),
            Commands::SetParam { caller, id, value, activation } => (
                caller,
                GovCall::SetParam {
                    id: *id,
                    value: value.clone(),
                    activation: *activation,
                },
            ),
            Commands::SetParamVotable { caller, id, votable } => {
                (caller, GovCall::SetParamVotable { id: *id, votable: *votable })
            }
            Commands::AddValidator { caller, validator } => {
                (caller, GovCall::AddValidator { validator: *validator })
            }
            Commands::RemoveValidator { caller, validator } => {
                (caller, GovCall::RemoveValidator { validator: *validator })
            }
            Commands::SetUpdateValsVotable { caller, votable } => {
                (caller, GovCall::SetUpdateValsVotable { votable: *votable })
            }
            Commands::SetVoteContract { caller, vote_contract } => {
                (caller, GovCall::SetVoteContract { vote_contract: *vote_contract })
            }
            Commands::TransferOwnership { caller, new_owner } => {
                (caller, GovCall::TransferOwnership { new_owner: *new_owner })
            }
            _ => return None,
        };
        Some(pair)
    }
}

/// Who is calling
#[derive(Args, Debug, Clone, Default)]
pub struct CallerArgs {
    /// Caller account (hex)
    #[arg(long, env = "GOVPARAM_CALLER", conflicts_with = "caller_key")]
    pub caller: Option<AccountId>,

    /// ed25519 key file of the caller (from `key generate`)
    #[arg(long)]
    pub caller_key: Option<PathBuf>,
}

/// Create the store
#[derive(Parser, Debug)]
pub struct InitCmd {
    /// Genesis JSON file (owner, validators, params, ...)
    #[arg(long)]
    pub genesis: Option<PathBuf>,

    /// Without a genesis file: the caller becomes owner and sole validator
    #[command(flatten)]
    pub owner: CallerArgs,

    /// Without a genesis file: start with no parameters
    #[arg(long, conflicts_with = "genesis")]
    pub empty: bool,

    /// Initial head height
    #[arg(long, default_value = "0")]
    pub head: BlockNumber,
}

/// Serve JSON-RPC
#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// RPC listen port
    #[arg(long, default_value = "9944", env = "GOVPARAM_RPC_PORT")]
    pub rpc_port: u16,

    /// RPC listen address (use 0.0.0.0 for public)
    #[arg(long, default_value = "127.0.0.1")]
    pub rpc_addr: String,

    /// Allowed CORS origin (repeatable, localhost only if none)
    #[arg(long = "rpc-cors")]
    pub rpc_cors: Vec<String>,
}

/// Key management commands
#[derive(Parser, Debug)]
pub struct KeyCmd {
    #[command(subcommand)]
    pub subcommand: KeySubcommand,
}

#[derive(Subcommand, Debug)]
pub enum KeySubcommand {
    /// Generate a new ed25519 keypair
    Generate {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (hex, json)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Inspect a secret key, a public key or a key file
    Inspect {
        /// Hex key or path to a key file
        key: String,
    },
}

/// Purge node data
#[derive(Parser, Debug)]
pub struct PurgeCmd {
    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Hex value argument, with or without 0x
pub fn parse_param_value(s: &str) -> Result<ParamValue, String> {
    ParamValue::from_hex(s).map_err(|e| format!("invalid hex value: {}", e))
}
