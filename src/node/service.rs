// Service - Point d'entrée unique des appels de gouvernance
// Principle: an accepted call is one atomic commit, a rejected call writes nothing

use crate::contracts::gov_param::{GovParamContract, GovParamError, GovParamEvent};
use crate::genesis::{GenesisBuilder, GenesisError, GenesisSpec};
use crate::storage::{Database, DatabaseError, EventRecord, StateBackend, StateError};
use crate::types::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sous-répertoire de la base dans le répertoire de données
const DB_DIR: &str = "db";

/// Working directory of the read-only instance used by `serve`
const READER_DIR: &str = "rpc-reader";

/// Parameter store service bound to a data directory
pub struct GovParamService {
    /// Data directory path
    data_path: PathBuf,

    /// Storage backend
    state: StateBackend,

    /// Store as of the last commit
    store: GovParamContract,

    /// Chain head height
    head: BlockNumber,
}

impl GovParamService {
    /// Initialise un nouveau répertoire de données depuis un genesis
    pub fn init(data_path: &Path, spec: GenesisSpec, head: BlockNumber) -> Result<Self, ServiceError> {
        let state = Self::open_state(data_path)?;
        if state.is_initialized()? {
            return Err(ServiceError::AlreadyInitialized(data_path.to_path_buf()));
        }

        let mut store = GenesisBuilder::new(spec).build()?;
        // Genesis setup is not part of the event log
        store.drain_events();

        state.init(&store, head)?;
        info!(
            "Store initialized at {} (head #{}, state {})",
            data_path.display(),
            head,
            store.state_hash()?
        );

        Ok(Self {
            data_path: data_path.to_path_buf(),
            state,
            store,
            head,
        })
    }

    /// Ouvre un répertoire de données existant
    pub fn open(data_path: &Path) -> Result<Self, ServiceError> {
        let state = Self::open_state(data_path)?;
        let store = state
            .load_store()?
            .ok_or_else(|| ServiceError::NotInitialized(data_path.to_path_buf()))?;
        let head = state.best_block()?;

        debug!("Opened store at {} (head #{})", data_path.display(), head);

        Ok(Self {
            data_path: data_path.to_path_buf(),
            state,
            store,
            head,
        })
    }

    /// Read-only view of a data directory that a writer may hold open.
    ///
    /// Every `StateBackend::load_view` on the result first catches up with
    /// the writer's commits.
    pub fn open_reader(data_path: &Path) -> Result<StateBackend, ServiceError> {
        let db = Database::open_as_secondary(data_path.join(DB_DIR), data_path.join(READER_DIR))?;
        let state = StateBackend::new(db);
        if !state.is_initialized()? {
            return Err(ServiceError::NotInitialized(data_path.to_path_buf()));
        }

        debug!("Reader opened at {}", data_path.display());
        Ok(state)
    }

    fn open_state(data_path: &Path) -> Result<StateBackend, ServiceError> {
        let db = Database::open(data_path.join(DB_DIR))?;
        Ok(StateBackend::new(db))
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn head(&self) -> BlockNumber {
        self.head
    }

    /// Committed store. Readers that resolve pending changes work on a copy.
    pub fn store(&self) -> &GovParamContract {
        &self.store
    }

    /// Copy of the store for lazy reads
    pub fn snapshot(&self) -> GovParamContract {
        self.store.clone()
    }

    /// Apply `call` as `caller` at the head height
    ///
    /// The call runs against a working copy; the snapshot and its events are
    /// committed together only if the call succeeds.
    pub fn submit(
        &mut self,
        caller: &AccountId,
        call: GovCall,
    ) -> Result<Vec<GovParamEvent>, ServiceError> {
        let name = call.name();
        let gate = if call.is_admin_only() { "owner only" } else { "votable" };
        let mut working = self.store.clone();

        if let Err(e) = working.apply(caller, call, self.head) {
            warn!("{} ({}) from {} rejected at #{}: {}", name, gate, caller, self.head, e);
            return Err(e.into());
        }

        let events = working.drain_events();
        self.state.commit(&working, &events, self.head)?;
        self.store = working;

        info!("{} from {} applied at #{} ({} events)", name, caller, self.head, events.len());
        Ok(events)
    }

    /// Avance la tête de `blocks` blocs
    pub fn advance(&mut self, blocks: BlockNumber) -> Result<BlockNumber, ServiceError> {
        let target = self
            .head
            .checked_add(blocks)
            .ok_or(ServiceError::HeightOverflow(self.head))?;

        self.state.set_best_block(target)?;
        self.head = target;

        info!("Head advanced to #{}", target);
        Ok(target)
    }

    /// Hauteur effective d'une lecture. Les blocs ne reculent jamais.
    pub fn read_height(&self, height: Option<BlockNumber>) -> Result<BlockNumber, ServiceError> {
        resolve_read_height(self.head, height)
    }

    /// Journal d'événements à partir de `from`
    pub fn events(&self, from: u64) -> Result<Vec<EventRecord>, ServiceError> {
        Ok(self.state.events(from)?)
    }

    pub fn event_count(&self) -> Result<u64, ServiceError> {
        Ok(self.state.event_count()?)
    }
}

/// Reads below the head are refused: resolved changes overwrite the older value
pub fn resolve_read_height(
    head: BlockNumber,
    height: Option<BlockNumber>,
) -> Result<BlockNumber, ServiceError> {
    match height {
        None => Ok(head),
        Some(h) if h < head => Err(ServiceError::HeightBelowHead { requested: h, head }),
        Some(h) => Ok(h),
    }
}

/// Erreurs du service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Rejected(#[from] GovParamError),

    #[error("Genesis error: {0}")]
    Genesis(#[from] GenesisError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("No store at {0} (run `init` first)")]
    NotInitialized(PathBuf),

    #[error("Store already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Height {requested} is below the head #{head}")]
    HeightBelowHead {
        requested: BlockNumber,
        head: BlockNumber,
    },

    #[error("Head height overflow from #{0}")]
    HeightOverflow(BlockNumber),
}
