// State - Persistance du store de paramètres
use super::db::{Database, DatabaseError, WriteOp};
use crate::contracts::gov_param::{GovParamContract, GovParamEvent};
use crate::types::BlockNumber;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Storage key prefixes
const KEY_STORE: &[u8] = b"govparam_store";
const KEY_BEST_BLOCK: &[u8] = b"best_block";
const KEY_EVENT_SEQ: &[u8] = b"event_seq";
const PREFIX_EVENT: &[u8] = b"event:";

/// Notification as kept in the event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position dans le journal (0, 1, 2, ...)
    pub seq: u64,

    /// Bloc auquel l'appel a été appliqué
    pub block: BlockNumber,

    pub event: GovParamEvent,
}

/// Backend de stockage: snapshot du store, hauteur de tête, journal d'événements
#[derive(Clone)]
pub struct StateBackend {
    db: Database,
}

impl StateBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Le store a-t-il déjà été initialisé
    pub fn is_initialized(&self) -> Result<bool, StateError> {
        Ok(self.db.exists(KEY_STORE)?)
    }

    /// Charge le snapshot du store
    pub fn load_store(&self) -> Result<Option<GovParamContract>, StateError> {
        match self.db.get(KEY_STORE)? {
            Some(data) => {
                let store = bincode::deserialize(&data)
                    .map_err(|e| StateError::DeserializationFailed(e.to_string()))?;
                Ok(Some(store))
            }
            None => Ok(None),
        }
    }

    /// Store and head as last written, after catching up with the writer
    /// when this backend is a secondary instance.
    pub fn load_view(&self) -> Result<(GovParamContract, BlockNumber), StateError> {
        self.db.catch_up()?;
        let store = self.load_store()?.ok_or(StateError::NotInitialized)?;
        Ok((store, self.best_block()?))
    }

    /// Hauteur de tête (0 avant tout bloc)
    pub fn best_block(&self) -> Result<BlockNumber, StateError> {
        self.read_u64(KEY_BEST_BLOCK)
    }

    /// Nombre d'événements enregistrés
    pub fn event_count(&self) -> Result<u64, StateError> {
        self.read_u64(KEY_EVENT_SEQ)
    }

    /// Écrit le store genesis. Refuse d'écraser un store existant.
    pub fn init(&self, store: &GovParamContract, block: BlockNumber) -> Result<(), StateError> {
        if self.is_initialized()? {
            return Err(StateError::AlreadyInitialized);
        }

        let mut ops = vec![
            WriteOp::Put {
                key: KEY_BEST_BLOCK.to_vec(),
                value: block.to_be_bytes().to_vec(),
            },
            WriteOp::Put {
                key: KEY_EVENT_SEQ.to_vec(),
                value: 0u64.to_be_bytes().to_vec(),
            },
        ];
        ops.push(Self::store_op(store)?);

        self.db.batch_write(ops)?;
        Ok(())
    }

    /// Commit atomique: snapshot + événements + compteur, en un seul batch
    pub fn commit(
        &self,
        store: &GovParamContract,
        events: &[GovParamEvent],
        block: BlockNumber,
    ) -> Result<(), StateError> {
        let first_seq = self.event_count()?;
        let mut ops = vec![Self::store_op(store)?];

        for (offset, event) in events.iter().enumerate() {
            let seq = first_seq + offset as u64;
            let record = EventRecord {
                seq,
                block,
                event: event.clone(),
            };
            let value = bincode::serialize(&record)
                .map_err(|e| StateError::SerializationFailed(e.to_string()))?;
            ops.push(WriteOp::Put {
                key: Self::event_key(seq),
                value,
            });
        }

        ops.push(WriteOp::Put {
            key: KEY_EVENT_SEQ.to_vec(),
            value: (first_seq + events.len() as u64).to_be_bytes().to_vec(),
        });

        self.db.batch_write(ops)?;
        debug!("Committed store at block {} with {} events", block, events.len());
        Ok(())
    }

    /// Avance la tête. La hauteur ne recule jamais.
    pub fn set_best_block(&self, block: BlockNumber) -> Result<(), StateError> {
        let current = self.best_block()?;
        if block < current {
            return Err(StateError::HeightRegression { current, requested: block });
        }
        self.db.put(KEY_BEST_BLOCK, &block.to_be_bytes())?;
        Ok(())
    }

    /// Journal d'événements à partir de `from`, dans l'ordre
    pub fn events(&self, from: u64) -> Result<Vec<EventRecord>, StateError> {
        let start = Self::event_key(from);
        self.db
            .iter_from(PREFIX_EVENT, &start)
            .map(|item| -> Result<EventRecord, StateError> {
                let (_, value) = item?;
                bincode::deserialize(&value)
                    .map_err(|e| StateError::DeserializationFailed(e.to_string()))
            })
            .collect()
    }

    fn store_op(store: &GovParamContract) -> Result<WriteOp, StateError> {
        let value =
            bincode::serialize(store).map_err(|e| StateError::SerializationFailed(e.to_string()))?;
        Ok(WriteOp::Put {
            key: KEY_STORE.to_vec(),
            value,
        })
    }

    /// Big-endian so that key order is sequence order
    fn event_key(seq: u64) -> Vec<u8> {
        let mut key = PREFIX_EVENT.to_vec();
        key.extend_from_slice(&seq.to_be_bytes());
        key
    }

    fn read_u64(&self, key: &[u8]) -> Result<u64, StateError> {
        match self.db.get(key)? {
            Some(data) => {
                let bytes: [u8; 8] = data
                    .as_slice()
                    .try_into()
                    .map_err(|_| StateError::DeserializationFailed(format!("bad u64 at {:?}", key)))?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }
}

/// Erreurs d'état
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Erreur de base de données: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Échec de sérialisation: {0}")]
    SerializationFailed(String),

    #[error("Échec de désérialisation: {0}")]
    DeserializationFailed(String),

    #[error("Store déjà initialisé")]
    AlreadyInitialized,

    #[error("Store non initialisé (lancer `init` d'abord)")]
    NotInitialized,

    #[error("La hauteur ne peut pas reculer: {current} -> {requested}")]
    HeightRegression {
        current: BlockNumber,
        requested: BlockNumber,
    },
}
