// Consensus - Validator set consumed by the consensus engine
// Principle: Membership changes are governed, never implicit.

pub mod validator;

pub use validator::{ValidatorError, ValidatorSet};
