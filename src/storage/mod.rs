// Storage - Couche de persistance (RocksDB)
// Principe: un appel accepté = un batch atomique

pub mod db;
pub mod state;

pub use db::*;
pub use state::*;
