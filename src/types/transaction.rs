// Transaction - Appels de gouvernance (minimaux)
use super::account::AccountId;
use super::primitives::{BlockNumber, ParamId, ParamValue};
use serde::{Deserialize, Serialize};

/// Every mutating entry point of the parameter store.
///
/// A call is applied as one transaction: it either fully succeeds or leaves
/// the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovCall {
    /// Register a new parameter (owner only)
    AddParam {
        id: ParamId,
        name: String,
        votable: bool,
        value: ParamValue,
    },

    /// Schedule a value change at a future block
    SetParam {
        id: ParamId,
        value: ParamValue,
        activation: BlockNumber,
    },

    /// Allow or forbid the vote contract to schedule changes (owner only)
    SetParamVotable {
        id: ParamId,
        votable: bool,
    },

    /// Add a validator
    AddValidator {
        validator: AccountId,
    },

    /// Remove a validator
    RemoveValidator {
        validator: AccountId,
    },

    /// Allow or forbid the vote contract to edit the validator set (owner only)
    SetUpdateValsVotable {
        votable: bool,
    },

    /// Designate the trusted vote contract (owner only)
    SetVoteContract {
        vote_contract: AccountId,
    },

    /// Hand the store over to a new owner (owner only)
    TransferOwnership {
        new_owner: AccountId,
    },
}

impl GovCall {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            GovCall::AddParam { .. } => "addParam",
            GovCall::SetParam { .. } => "setParam",
            GovCall::SetParamVotable { .. } => "setParamVotable",
            GovCall::AddValidator { .. } => "addValidator",
            GovCall::RemoveValidator { .. } => "removeValidator",
            GovCall::SetUpdateValsVotable { .. } => "setUpdateValsVotable",
            GovCall::SetVoteContract { .. } => "setVoteContract",
            GovCall::TransferOwnership { .. } => "transferOwnership",
        }
    }

    /// Administrative calls have no vote-contract path
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            GovCall::AddParam { .. }
                | GovCall::SetParamVotable { .. }
                | GovCall::SetUpdateValsVotable { .. }
                | GovCall::SetVoteContract { .. }
                | GovCall::TransferOwnership { .. }
        )
    }
}
