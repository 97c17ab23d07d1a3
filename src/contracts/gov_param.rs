// GovParam - Governed network parameters and validator registry
//
// Principle: parameters change slowly, and only through the owner or a vote.
// Nodes read values here; the vote contract writes here once a proposal has
// passed elsewhere.

use crate::consensus::validator::{ValidatorError, ValidatorSet};
use crate::contracts::access::{AccessControl, AccessError};
use crate::contracts::params::{ParamError, Parameter, ParameterRegistry, ScheduledChange};
use crate::types::{AccountId, BlockNumber, GovCall, Hash, ParamId, ParamValue};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parameter store contract
///
/// Every mutating method checks all of its preconditions before touching
/// state, so a returned error means nothing changed and nothing was emitted.
/// Accessors that resolve pending changes take `&mut self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovParamContract {
    access: AccessControl,
    params: ParameterRegistry,
    validators: ValidatorSet,

    /// Notifications not yet drained by the host
    #[serde(skip)]
    events: Vec<GovParamEvent>,
}

impl GovParamContract {
    /// Create the store with its owner and genesis validators
    pub fn new(owner: AccountId, validators: Vec<AccountId>) -> Result<Self, GovParamError> {
        if owner.is_zero() {
            return Err(AccessError::InvalidOwner.into());
        }

        Ok(Self {
            access: AccessControl::new(owner),
            params: ParameterRegistry::new(),
            validators: ValidatorSet::new(validators)?,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // ACCESS
    // =========================================================================

    pub fn owner(&self) -> AccountId {
        self.access.owner()
    }

    pub fn vote_contract(&self) -> Option<AccountId> {
        self.access.vote_contract()
    }

    pub fn set_vote_contract(
        &mut self,
        caller: &AccountId,
        vote_contract: AccountId,
    ) -> Result<(), GovParamError> {
        let previous = self.access.set_vote_contract(caller, vote_contract)?;

        info!("Vote contract set to {}", vote_contract);
        self.events.push(GovParamEvent::VoteContractChanged {
            previous,
            current: vote_contract,
        });
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), GovParamError> {
        let previous = self.access.transfer_ownership(caller, new_owner)?;

        info!("Ownership transferred from {} to {}", previous, new_owner);
        self.events.push(GovParamEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    pub fn add_param(
        &mut self,
        caller: &AccountId,
        id: ParamId,
        name: String,
        votable: bool,
        value: ParamValue,
    ) -> Result<(), GovParamError> {
        self.params
            .add_param(&self.access, caller, id, name.clone(), votable, value)?;

        info!("Parameter {} added as id {} (votable: {})", name, id, votable);
        self.events.push(GovParamEvent::ParamAdded { id, name, votable });
        Ok(())
    }

    pub fn set_param(
        &mut self,
        caller: &AccountId,
        id: ParamId,
        value: ParamValue,
        activation: BlockNumber,
        current_block: BlockNumber,
    ) -> Result<(), GovParamError> {
        let change = self
            .params
            .set_param(&self.access, caller, id, value, activation, current_block)?;

        info!(
            "Scheduled {} (id {}) = {} at block {}",
            change.name, change.id, change.value, change.activation
        );
        self.events.push(GovParamEvent::SetParam {
            id: change.id,
            name: change.name,
            value: change.value,
            activation: change.activation,
        });
        Ok(())
    }

    pub fn get_param(
        &mut self,
        id: ParamId,
        current_block: BlockNumber,
    ) -> Result<&ParamValue, GovParamError> {
        Ok(self.params.get_param(id, current_block)?)
    }

    pub fn get_all_params(&mut self, current_block: BlockNumber) -> Vec<(String, ParamValue)> {
        self.params.get_all_params(current_block)
    }

    pub fn set_param_votable(
        &mut self,
        caller: &AccountId,
        id: ParamId,
        votable: bool,
    ) -> Result<(), GovParamError> {
        self.params
            .set_param_votable(&self.access, caller, id, votable)?;

        info!("Parameter id {} votable: {}", id, votable);
        Ok(())
    }

    pub fn scheduled_changes(&self, current_block: BlockNumber) -> Vec<ScheduledChange> {
        self.params.scheduled_changes(current_block)
    }

    /// Raw parameter record, including any unresolved pending slot
    pub fn param(&self, id: ParamId) -> Option<&Parameter> {
        self.params.param(id)
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    // =========================================================================
    // VALIDATORS
    // =========================================================================

    pub fn add_validator(
        &mut self,
        caller: &AccountId,
        validator: AccountId,
    ) -> Result<(), GovParamError> {
        self.validators
            .add_validator(&self.access, caller, validator)?;

        info!("Validator {} added ({} total)", validator, self.validators.len());
        self.events.push(GovParamEvent::ValidatorAdded { validator });
        Ok(())
    }

    pub fn remove_validator(
        &mut self,
        caller: &AccountId,
        validator: AccountId,
    ) -> Result<(), GovParamError> {
        self.validators
            .remove_validator(&self.access, caller, &validator)?;

        info!("Validator {} removed ({} left)", validator, self.validators.len());
        self.events.push(GovParamEvent::ValidatorRemoved { validator });
        Ok(())
    }

    pub fn get_validators(&self) -> &[AccountId] {
        self.validators.validators()
    }

    pub fn set_update_vals_votable(
        &mut self,
        caller: &AccountId,
        votable: bool,
    ) -> Result<(), GovParamError> {
        self.validators.set_votable(&self.access, caller, votable)?;

        info!("Validator set votable: {}", votable);
        Ok(())
    }

    pub fn update_vals_votable(&self) -> bool {
        self.validators.is_votable()
    }

    // =========================================================================
    // DISPATCH / EVENTS / DIGEST
    // =========================================================================

    /// Apply a call as `caller` at `current_block`
    pub fn apply(
        &mut self,
        caller: &AccountId,
        call: GovCall,
        current_block: BlockNumber,
    ) -> Result<(), GovParamError> {
        match call {
            GovCall::AddParam { id, name, votable, value } => {
                self.add_param(caller, id, name, votable, value)
            }
            GovCall::SetParam { id, value, activation } => {
                self.set_param(caller, id, value, activation, current_block)
            }
            GovCall::SetParamVotable { id, votable } => self.set_param_votable(caller, id, votable),
            GovCall::AddValidator { validator } => self.add_validator(caller, validator),
            GovCall::RemoveValidator { validator } => self.remove_validator(caller, validator),
            GovCall::SetUpdateValsVotable { votable } => {
                self.set_update_vals_votable(caller, votable)
            }
            GovCall::SetVoteContract { vote_contract } => {
                self.set_vote_contract(caller, vote_contract)
            }
            GovCall::TransferOwnership { new_owner } => self.transfer_ownership(caller, new_owner),
        }
    }

    /// Notifications emitted since the last drain
    pub fn events(&self) -> &[GovParamEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GovParamEvent> {
        std::mem::take(&mut self.events)
    }

    /// Blake3 digest of the canonical snapshot (events excluded)
    pub fn state_hash(&self) -> Result<Hash, GovParamError> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GovParamError::Serialization(e.to_string()))?;
        Ok(Hash::hash(&bytes))
    }
}

/// Errors returned by the parameter store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovParamError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Validator(#[from] ValidatorError),

    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

// =============================================================================
// EVENTS
// =============================================================================

/// Notifications for off-chain observers and indexers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovParamEvent {
    /// Parameter registered
    ParamAdded {
        id: ParamId,
        name: String,
        votable: bool,
    },

    /// Change scheduled
    SetParam {
        id: ParamId,
        name: String,
        value: ParamValue,
        activation: BlockNumber,
    },

    /// Validator added
    ValidatorAdded {
        validator: AccountId,
    },

    /// Validator removed
    ValidatorRemoved {
        validator: AccountId,
    },

    /// Vote contract designated
    VoteContractChanged {
        previous: Option<AccountId>,
        current: AccountId,
    },

    /// Owner changed
    OwnershipTransferred {
        previous: AccountId,
        current: AccountId,
    },
}

// =============================================================================
// TESTS
// =============================================================================
