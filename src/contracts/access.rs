// Access - Two-tier permission gate (owner / vote contract)
//
// The owner can do everything. The vote contract can only act where a votable
// flag says so. Nobody else can mutate anything.

use crate::types::AccountId;
use serde::{Deserialize, Serialize};

/// Owner and delegated vote authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    /// Administrative account, bypasses every votable flag
    owner: AccountId,

    /// Trusted governance contract, unset until the owner designates one
    vote_contract: Option<AccountId>,
}

impl AccessControl {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            vote_contract: None,
        }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn vote_contract(&self) -> Option<AccountId> {
        self.vote_contract
    }

    pub fn is_owner(&self, caller: &AccountId) -> bool {
        *caller == self.owner
    }

    pub fn is_vote_contract(&self, caller: &AccountId) -> bool {
        self.vote_contract.as_ref() == Some(caller)
    }

    /// Permission decision for votable-gated operations
    pub fn authorize(&self, caller: &AccountId, votable: bool) -> bool {
        self.is_owner(caller) || (votable && self.is_vote_contract(caller))
    }

    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), AccessError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(AccessError::NotOwner)
        }
    }

    pub fn ensure_authorized(&self, caller: &AccountId, votable: bool) -> Result<(), AccessError> {
        if self.authorize(caller, votable) {
            Ok(())
        } else {
            Err(AccessError::PermissionDenied)
        }
    }

    pub fn set_vote_contract(
        &mut self,
        caller: &AccountId,
        vote_contract: AccountId,
    ) -> Result<Option<AccountId>, AccessError> {
        self.ensure_owner(caller)?;
        Ok(self.vote_contract.replace(vote_contract))
    }

    /// Returns the previous owner
    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<AccountId, AccessError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::InvalidOwner);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}

/// Errors raised by the permission gate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("caller is not the owner")]
    NotOwner,

    #[error("permission denied")]
    PermissionDenied,

    #[error("new owner is the zero account")]
    InvalidOwner,
}
