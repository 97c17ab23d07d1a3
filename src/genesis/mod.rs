// Genesis - Store initial des paramètres
pub mod spec;

pub use spec::{default_params, GenesisBuilder, GenesisError, GenesisParam, GenesisSpec};
