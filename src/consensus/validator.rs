// Validator - Ensemble des validateurs gouverné
use crate::contracts::access::AccessControl;
use crate::contracts::gov_param::GovParamError;
use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ensemble ordonné de validateurs
///
/// Membership is what matters, not position: removal swaps the last member
/// into the freed slot, so the order of the remaining members is not stable
/// across removals. The set is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ValidatorSetRecord", into = "ValidatorSetRecord")]
pub struct ValidatorSet {
    /// Membres, dans l'ordre observable
    validators: Vec<AccountId>,

    /// Position de chaque membre dans `validators`
    index: HashMap<AccountId, usize>,

    /// Whether the vote contract may add/remove validators
    votable: bool,
}

impl ValidatorSet {
    /// Build the genesis set; it must hold at least one validator and no duplicates
    pub fn new(initial: Vec<AccountId>) -> Result<Self, ValidatorError> {
        if initial.is_empty() {
            return Err(ValidatorError::AtLeastOneValidatorRequired);
        }

        let mut index = HashMap::with_capacity(initial.len());
        for (position, validator) in initial.iter().enumerate() {
            if index.insert(*validator, position).is_some() {
                return Err(ValidatorError::ValidatorExists(*validator));
            }
        }

        Ok(Self {
            validators: initial,
            index,
            votable: false,
        })
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn contains(&self, validator: &AccountId) -> bool {
        self.index.contains_key(validator)
    }

    pub fn validators(&self) -> &[AccountId] {
        &self.validators
    }

    pub fn is_votable(&self) -> bool {
        self.votable
    }

    /// Append a validator
    pub fn add_validator(
        &mut self,
        access: &AccessControl,
        caller: &AccountId,
        validator: AccountId,
    ) -> Result<(), GovParamError> {
        access.ensure_authorized(caller, self.votable)?;

        if self.index.contains_key(&validator) {
            return Err(ValidatorError::ValidatorExists(validator).into());
        }

        self.index.insert(validator, self.validators.len());
        self.validators.push(validator);
        Ok(())
    }

    /// Swap-remove a validator in O(1)
    pub fn remove_validator(
        &mut self,
        access: &AccessControl,
        caller: &AccountId,
        validator: &AccountId,
    ) -> Result<(), GovParamError> {
        access.ensure_authorized(caller, self.votable)?;

        let position = *self
            .index
            .get(validator)
            .ok_or(ValidatorError::NoSuchValidator(*validator))?;

        if self.validators.len() == 1 {
            return Err(ValidatorError::AtLeastOneValidatorRequired.into());
        }

        self.validators.swap_remove(position);
        self.index.remove(validator);
        if let Some(moved) = self.validators.get(position) {
            self.index.insert(*moved, position);
        }
        Ok(())
    }

    pub fn set_votable(
        &mut self,
        access: &AccessControl,
        caller: &AccountId,
        votable: bool,
    ) -> Result<(), GovParamError> {
        access.ensure_owner(caller)?;
        self.votable = votable;
        Ok(())
    }
}

/// Serialized form: the index is rebuilt on load
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ValidatorSetRecord {
    validators: Vec<AccountId>,
    #[serde(default)]
    votable: bool,
}

impl TryFrom<ValidatorSetRecord> for ValidatorSet {
    type Error = ValidatorError;

    fn try_from(record: ValidatorSetRecord) -> Result<Self, Self::Error> {
        let mut set = ValidatorSet::new(record.validators)?;
        set.votable = record.votable;
        Ok(set)
    }
}

impl From<ValidatorSet> for ValidatorSetRecord {
    fn from(set: ValidatorSet) -> Self {
        Self {
            validators: set.validators,
            votable: set.votable,
        }
    }
}

/// Erreurs de l'ensemble des validateurs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    #[error("validator already exists: {0}")]
    ValidatorExists(AccountId),

    #[error("no such validator: {0}")]
    NoSuchValidator(AccountId),

    #[error("at least one validator required")]
    AtLeastOneValidatorRequired,
}
