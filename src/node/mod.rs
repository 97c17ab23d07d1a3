// Node - Service du store de paramètres
pub mod service;

pub use service::{resolve_read_height, GovParamService, ServiceError};
