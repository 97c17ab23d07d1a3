// Database - Abstraction RocksDB
use rocksdb::{Direction, IteratorMode, Options, DB};
use std::path::Path;
use std::sync::Arc;

/// Wrapper autour de RocksDB
#[derive(Clone)]
pub struct Database {
    db: Arc<DB>,

    /// Instance secondaire: suit une base ouverte par un autre processus
    secondary: bool,
}

impl Database {
    /// Ouvre ou crée une base de données
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        // Le store est petit: peu de fichiers, peu de jobs
        opts.set_keep_log_file_num(5);
        opts.set_max_background_jobs(2);

        let db = DB::open(&opts, path).map_err(|e| DatabaseError::OpenFailed(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            secondary: false,
        })
    }

    /// Ouvre une instance secondaire (lecture seule) d'une base existante.
    ///
    /// Ne prend pas le verrou de la base: le primaire continue d'écrire, et
    /// `catch_up` rattrape ses écritures. `secondary_path` reçoit les logs.
    pub fn open_as_secondary<P: AsRef<Path>, S: AsRef<Path>>(
        primary_path: P,
        secondary_path: S,
    ) -> Result<Self, DatabaseError> {
        let mut opts = Options::default();
        opts.create_if_missing(false);
        // Required by secondary instances
        opts.set_max_open_files(-1);
        opts.set_keep_log_file_num(5);

        let db = DB::open_as_secondary(&opts, primary_path.as_ref(), secondary_path.as_ref())
            .map_err(|e| DatabaseError::OpenFailed(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            secondary: true,
        })
    }

    pub fn is_secondary(&self) -> bool {
        self.secondary
    }

    /// Rattrape les écritures du primaire. Sans effet sur un primaire.
    pub fn catch_up(&self) -> Result<(), DatabaseError> {
        if !self.secondary {
            return Ok(());
        }
        self.db
            .try_catch_up_with_primary()
            .map_err(|e| DatabaseError::ReadFailed(e.to_string()))
    }

    /// Lit une valeur
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError> {
        self.db
            .get(key)
            .map_err(|e| DatabaseError::ReadFailed(e.to_string()))
    }

    /// Écrit une valeur
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), DatabaseError> {
        self.db
            .put(key, value)
            .map_err(|e| DatabaseError::WriteFailed(e.to_string()))
    }

    /// Supprime une clé
    pub fn delete(&self, key: &[u8]) -> Result<(), DatabaseError> {
        self.db
            .delete(key)
            .map_err(|e| DatabaseError::WriteFailed(e.to_string()))
    }

    /// Vérifie si une clé existe
    pub fn exists(&self, key: &[u8]) -> Result<bool, DatabaseError> {
        Ok(self.get(key)?.is_some())
    }

    /// Batch write (transaction atomique)
    pub fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), DatabaseError> {
        let mut batch = rocksdb::WriteBatch::default();

        for op in ops {
            match op {
                WriteOp::Put { key, value } => batch.put(&key, &value),
                WriteOp::Delete { key } => batch.delete(&key),
            }
        }

        self.db
            .write(batch)
            .map_err(|e| DatabaseError::WriteFailed(e.to_string()))
    }

    /// Itère sur les clés de `prefix` à partir de `start`, dans l'ordre des clés
    ///
    /// `start` doit commencer par `prefix`.
    pub fn iter_from<'a>(
        &'a self,
        prefix: &'a [u8],
        start: &[u8],
    ) -> impl Iterator<Item = Result<(Vec<u8>, Vec<u8>), DatabaseError>> + 'a {
        self.db
            .iterator(IteratorMode::From(start, Direction::Forward))
            .map(|item| {
                item.map(|(key, value)| (key.to_vec(), value.to_vec()))
                    .map_err(|e| DatabaseError::ReadFailed(e.to_string()))
            })
            .take_while(move |result| match result {
                Ok((key, _)) => key.starts_with(prefix),
                Err(_) => true,
            })
    }
}

/// Opération d'écriture pour batch
#[derive(Debug, Clone)]
pub enum WriteOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Erreurs de base de données
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Échec d'ouverture de la DB: {0}")]
    OpenFailed(String),

    #[error("Échec de lecture: {0}")]
    ReadFailed(String),

    #[error("Échec d'écriture: {0}")]
    WriteFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_basic_ops() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(temp_dir.path()).unwrap();

        db.put(b"key1", b"value1").unwrap();
        assert_eq!(db.get(b"key1").unwrap(), Some(b"value1".to_vec()));

        assert!(db.exists(b"key1").unwrap());
        assert!(!db.exists(b"key2").unwrap());

        db.delete(b"key1").unwrap();
        assert!(!db.exists(b"key1").unwrap());
    }

    #[test]
    fn test_database_batch() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(temp_dir.path()).unwrap();
        db.put(b"stale", b"x").unwrap();

        let ops = vec![
            WriteOp::Put {
                key: b"key1".to_vec(),
                value: b"value1".to_vec(),
            },
            WriteOp::Put {
                key: b"key2".to_vec(),
                value: b"value2".to_vec(),
            },
            WriteOp::Delete {
                key: b"stale".to_vec(),
            },
        ];

        db.batch_write(ops).unwrap();

        assert!(db.exists(b"key1").unwrap());
        assert!(db.exists(b"key2").unwrap());
        assert!(!db.exists(b"stale").unwrap());
    }

    #[test]
    fn test_iter_from_seeks_and_stops_at_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(temp_dir.path()).unwrap();

        db.put(b"event:\x00\x02", b"c").unwrap();
        db.put(b"event:\x00\x01", b"b").unwrap();
        db.put(b"event:\x00\x00", b"a").unwrap();
        db.put(b"store", b"s").unwrap();

        let items: Vec<_> = db
            .iter_from(b"event:", b"event:")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].1, b"a".to_vec());

        let items: Vec<_> = db
            .iter_from(b"event:", b"event:\x00\x01")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].1, b"b".to_vec());
        assert_eq!(items[1].1, b"c".to_vec());
    }

    #[test]
    fn test_secondary_follows_primary() {
        let temp_dir = TempDir::new().unwrap();
        let primary = Database::open(temp_dir.path().join("db")).unwrap();
        primary.put(b"head", b"1").unwrap();

        let secondary =
            Database::open_as_secondary(temp_dir.path().join("db"), temp_dir.path().join("ro")).unwrap();
        assert!(secondary.is_secondary());
        assert_eq!(secondary.get(b"head").unwrap(), Some(b"1".to_vec()));

        primary.put(b"head", b"2").unwrap();
        secondary.catch_up().unwrap();
        assert_eq!(secondary.get(b"head").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_secondary_requires_existing_db() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            Database::open_as_secondary(temp_dir.path().join("missing"), temp_dir.path().join("ro")),
            Err(DatabaseError::OpenFailed(_))
        ));
    }
}
