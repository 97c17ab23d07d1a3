// Contracts - System contracts embedded in the runtime
// Principle: No deployable smart contracts, everything is hardcoded and auditable

pub mod access;
pub mod params;
pub mod gov_param;

pub use access::{AccessControl, AccessError};
pub use gov_param::{GovParamContract, GovParamError, GovParamEvent};
pub use params::{ParamError, Parameter, ParameterRegistry, PendingChange, ScheduledChange};
