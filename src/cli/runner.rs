// Runner - Command execution against the local store
// Principle: open, apply or read, report; the RPC server reads through a secondary view

use crate::cli::config::{ConfigError, NodeConfig};
use crate::cli::{Commands, InitCmd};
use crate::contracts::{GovParamError, GovParamEvent};
use crate::genesis::{GenesisError, GenesisSpec};
use crate::node::service::{GovParamService, ServiceError};
use crate::rpc::{RpcMethods, RpcServer, RpcServerError};
use crate::storage::EventRecord;
use crate::types::*;
use std::fmt::Write as _;
use std::path::Path;
use tokio::signal;
use tracing::info;

/// Execute a store command and return what to print
pub fn execute(base_path: &Path, command: &Commands) -> Result<String, RunnerError> {
    if let Some((caller, call)) = command.gov_call() {
        let account = caller.resolve()?;
        let mut service = GovParamService::open(base_path)?;
        let events = service.submit(&account, call)?;

        let mut out = format!("Applied at #{}", service.head());
        for event in &events {
            let _ = write!(out, "\n  {}", format_event(event));
        }
        return Ok(out);
    }

    match command {
        Commands::Init(cmd) => {
            let service = init_store(base_path, cmd)?;
            let store = service.store();
            Ok(format!(
                "Store initialized at {}\n  owner:      {}\n  validators: {}\n  parameters: {}\n  head:       #{}",
                base_path.display(),
                store.owner().to_hex(),
                store.get_validators().len(),
                store.param_count(),
                service.head()
            ))
        }

        Commands::GetParam { id, at } => {
            let service = GovParamService::open(base_path)?;
            let height = service.read_height(*at)?;
            let mut view = service.snapshot();
            let value = view.get_param(*id, height)?.clone();
            let name = view.param(*id).map(|p| p.name.clone()).unwrap_or_default();
            Ok(format!("{} ({}) = {} at #{}", name, id, value, height))
        }

        Commands::Params { at } => {
            let service = GovParamService::open(base_path)?;
            let height = service.read_height(*at)?;
            let mut view = service.snapshot();

            let mut out = format!("Parameters at #{}", height);
            for (name, value) in view.get_all_params(height) {
                let _ = write!(out, "\n  {:<36} {}", name, value);
            }
            Ok(out)
        }

        Commands::Scheduled { at } => {
            let service = GovParamService::open(base_path)?;
            let height = service.read_height(*at)?;
            let changes = service.store().scheduled_changes(height);

            if changes.is_empty() {
                return Ok(format!("No scheduled change after #{}", height));
            }
            let mut out = format!("Scheduled after #{}", height);
            for change in changes {
                let _ = write!(
                    out,
                    "\n  #{:<10} {} ({}) = {}",
                    change.activation, change.name, change.id, change.value
                );
            }
            Ok(out)
        }

        Commands::Validators => {
            let service = GovParamService::open(base_path)?;
            let validators = service.store().get_validators();
            Ok(validators
                .iter()
                .enumerate()
                .map(|(i, v)| format!("{:>3}  {}", i, v.to_hex()))
                .collect::<Vec<_>>()
                .join("\n"))
        }

        Commands::Info => {
            let service = GovParamService::open(base_path)?;
            let store = service.store();
            let vote_contract = store
                .vote_contract()
                .map(|vc| vc.to_hex())
                .unwrap_or_else(|| "-".to_string());

            Ok(format!(
                "Data path:        {}\nHead:             #{}\nOwner:            {}\nVote contract:    {}\nParameters:       {}\nScheduled:        {}\nValidators:       {} (votable: {})\nEvents:           {}\nState hash:       {}",
                service.data_path().display(),
                service.head(),
                store.owner().to_hex(),
                vote_contract,
                store.param_count(),
                store.scheduled_changes(service.head()).len(),
                store.get_validators().len(),
                store.update_vals_votable(),
                service.event_count()?,
                store.state_hash()?
            ))
        }

        Commands::Events { from } => {
            let service = GovParamService::open(base_path)?;
            let records = service.events(*from)?;
            if records.is_empty() {
                return Ok("No events".to_string());
            }
            Ok(records.iter().map(format_record).collect::<Vec<_>>().join("\n"))
        }

        Commands::Advance { blocks } => {
            let mut service = GovParamService::open(base_path)?;
            let head = service.advance(*blocks)?;
            Ok(format!("Head at #{}", head))
        }

        other => Err(RunnerError::NotAStoreCommand(format!("{:?}", other))),
    }
}

/// Create the store from a genesis file or the standard table
fn init_store(base_path: &Path, cmd: &InitCmd) -> Result<GovParamService, RunnerError> {
    let spec = match &cmd.genesis {
        Some(path) => {
            info!("Loading genesis from {}", path.display());
            GenesisSpec::from_file(path)?
        }
        None => {
            let owner = cmd.owner.resolve()?;
            if cmd.empty {
                GenesisSpec::empty(owner, vec![owner])
            } else {
                GenesisSpec::with_owner(owner)
            }
        }
    };

    std::fs::create_dir_all(base_path)
        .map_err(|e| RunnerError::Io(format!("Failed to create data dir: {}", e)))?;

    Ok(GovParamService::init(base_path, spec, cmd.head)?)
}

/// Serve JSON-RPC over the store until Ctrl-C
pub async fn run_rpc(config: NodeConfig) -> Result<(), RunnerError> {
    info!("Data path: {}", config.base_path.display());

    // Instance secondaire: les commandes CLI gardent la base en écriture
    let methods = RpcMethods::new(GovParamService::open_reader(&config.base_path)?);

    RpcServer::from_config(&config.rpc)
        .start(methods, async {
            let _ = signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// One line per notification
pub fn format_event(event: &GovParamEvent) -> String {
    match event {
        GovParamEvent::ParamAdded { id, name, votable } => {
            format!("ParamAdded {} ({}) votable={}", name, id, votable)
        }
        GovParamEvent::SetParam { id, name, value, activation } => {
            format!("SetParam {} ({}) = {} at #{}", name, id, value, activation)
        }
        GovParamEvent::ValidatorAdded { validator } => {
            format!("ValidatorAdded {}", validator.to_hex())
        }
        GovParamEvent::ValidatorRemoved { validator } => {
            format!("ValidatorRemoved {}", validator.to_hex())
        }
        GovParamEvent::VoteContractChanged { previous, current } => format!(
            "VoteContractChanged {} -> {}",
            previous.map(|a| a.to_hex()).unwrap_or_else(|| "-".to_string()),
            current.to_hex()
        ),
        GovParamEvent::OwnershipTransferred { previous, current } => {
            format!("OwnershipTransferred {} -> {}", previous.to_hex(), current.to_hex())
        }
    }
}

fn format_record(record: &EventRecord) -> String {
    format!("{:>6}  #{:<10} {}", record.seq, record.block, format_event(&record.event))
}

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Store(#[from] GovParamError),

    #[error("Genesis error: {0}")]
    Genesis(#[from] GenesisError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcServerError),

    #[error("Not a store command: {0}")]
    NotAStoreCommand(String),
}
