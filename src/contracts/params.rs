// Params - Parameter registry with delayed, lazily resolved activation
//
// A change is never applied by a scheduler. Each parameter keeps at most one
// pending change, and whoever touches the parameter after its activation
// height moves the pending value into place.

use crate::contracts::access::AccessControl;
use crate::contracts::gov_param::GovParamError;
use crate::types::{AccountId, BlockNumber, ParamId, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A value waiting for its activation height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChange {
    pub value: ParamValue,
    pub activation: BlockNumber,
}

impl PendingChange {
    /// Activation height reached
    pub fn is_ready(&self, current_block: BlockNumber) -> bool {
        current_block >= self.activation
    }
}

/// A governed network parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParamId,
    pub name: String,

    /// Whether the vote contract may schedule changes
    pub votable: bool,

    /// Value currently in force (as of the last resolution)
    pub value: ParamValue,

    pub pending: Option<PendingChange>,
}

impl Parameter {
    pub fn new(id: ParamId, name: String, votable: bool, value: ParamValue) -> Self {
        Self {
            id,
            name,
            votable,
            value,
            pending: None,
        }
    }

    /// Apply the pending change if its height is reached. Returns true if applied.
    pub fn resolve(&mut self, current_block: BlockNumber) -> bool {
        match self.pending.take() {
            Some(change) if change.is_ready(current_block) => {
                debug!(
                    "Activating {} (id {}) = {} at block {} (scheduled for {})",
                    self.name, self.id, change.value, current_block, change.activation
                );
                self.value = change.value;
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Value in force at `current_block`, without resolving
    pub fn value_at(&self, current_block: BlockNumber) -> &ParamValue {
        match &self.pending {
            Some(change) if change.is_ready(current_block) => &change.value,
            _ => &self.value,
        }
    }

    /// Pending change still in the future at `current_block`
    pub fn scheduled_at(&self, current_block: BlockNumber) -> Option<&PendingChange> {
        self.pending
            .as_ref()
            .filter(|change| !change.is_ready(current_block))
    }
}

/// An outstanding change as reported to readers and observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledChange {
    pub id: ParamId,
    pub name: String,
    pub activation: BlockNumber,
    pub value: ParamValue,
}

/// All parameters, keyed (and therefore ordered) by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRegistry {
    params: BTreeMap<ParamId, Parameter>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn contains(&self, id: ParamId) -> bool {
        self.params.contains_key(&id)
    }

    /// Raw parameter record (no resolution)
    pub fn param(&self, id: ParamId) -> Option<&Parameter> {
        self.params.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    /// Register a parameter. Administrative only: the votable gate does not apply.
    pub fn add_param(
        &mut self,
        access: &AccessControl,
        caller: &AccountId,
        id: ParamId,
        name: String,
        votable: bool,
        value: ParamValue,
    ) -> Result<(), GovParamError> {
        access.ensure_owner(caller)?;

        if name.is_empty() {
            return Err(ParamError::EmptyName.into());
        }
        if self.params.contains_key(&id) {
            return Err(ParamError::ParamExists(id).into());
        }

        self.params.insert(id, Parameter::new(id, name, votable, value));
        Ok(())
    }

    /// Schedule `value` to take effect at `activation`.
    ///
    /// Check order: permission (an unknown id counts as not votable), existence,
    /// activation height, then the pending slot after resolving it.
    pub fn set_param(
        &mut self,
        access: &AccessControl,
        caller: &AccountId,
        id: ParamId,
        value: ParamValue,
        activation: BlockNumber,
        current_block: BlockNumber,
    ) -> Result<ScheduledChange, GovParamError> {
        let votable = self.params.get(&id).map(|p| p.votable).unwrap_or(false);
        access.ensure_authorized(caller, votable)?;

        let param = self
            .params
            .get_mut(&id)
            .ok_or(ParamError::NoSuchParam(id))?;

        if activation <= current_block {
            return Err(ParamError::PastActivation {
                activation,
                current: current_block,
            }
            .into());
        }

        param.resolve(current_block);

        if let Some(pending) = &param.pending {
            return Err(ParamError::AlreadyPending {
                id,
                activation: pending.activation,
            }
            .into());
        }

        param.pending = Some(PendingChange {
            value: value.clone(),
            activation,
        });

        Ok(ScheduledChange {
            id,
            name: param.name.clone(),
            activation,
            value,
        })
    }

    /// Current value, after lazy resolution
    pub fn get_param(
        &mut self,
        id: ParamId,
        current_block: BlockNumber,
    ) -> Result<&ParamValue, ParamError> {
        let param = self
            .params
            .get_mut(&id)
            .ok_or(ParamError::NoSuchParam(id))?;
        param.resolve(current_block);
        Ok(&param.value)
    }

    /// Every parameter as (name, value), ascending id, after lazy resolution
    pub fn get_all_params(&mut self, current_block: BlockNumber) -> Vec<(String, ParamValue)> {
        self.resolve_all(current_block);
        self.params
            .values()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }

    pub fn set_param_votable(
        &mut self,
        access: &AccessControl,
        caller: &AccountId,
        id: ParamId,
        votable: bool,
    ) -> Result<(), GovParamError> {
        access.ensure_owner(caller)?;

        let param = self
            .params
            .get_mut(&id)
            .ok_or(ParamError::NoSuchParam(id))?;
        param.votable = votable;
        Ok(())
    }

    /// Pending changes still in the future at `current_block`, ascending id.
    ///
    /// A pending slot whose height is reached but that no call has resolved
    /// yet is already in force and is not listed.
    pub fn scheduled_changes(&self, current_block: BlockNumber) -> Vec<ScheduledChange> {
        self.params
            .values()
            .filter_map(|p| {
                p.scheduled_at(current_block).map(|change| ScheduledChange {
                    id: p.id,
                    name: p.name.clone(),
                    activation: change.activation,
                    value: change.value.clone(),
                })
            })
            .collect()
    }

    /// Resolve every ready pending change. Returns how many were applied.
    pub fn resolve_all(&mut self, current_block: BlockNumber) -> usize {
        self.params
            .values_mut()
            .map(|p| p.resolve(current_block))
            .filter(|applied| *applied)
            .count()
    }
}

/// Parameter registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("already existing id: {0}")]
    ParamExists(ParamId),

    #[error("no such parameter: {0}")]
    NoSuchParam(ParamId),

    #[error("already have a pending change (id {id}, activation {activation})")]
    AlreadyPending { id: ParamId, activation: BlockNumber },

    #[error("cannot set activation to past: {activation} <= current block {current}")]
    PastActivation {
        activation: BlockNumber,
        current: BlockNumber,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::access::AccessError;

    const UNIT_PRICE: ParamId = 5;

    fn owner() -> AccountId {
        AccountId::from_bytes([1; 32])
    }

    fn voter() -> AccountId {
        AccountId::from_bytes([2; 32])
    }

    fn value(s: &str) -> ParamValue {
        ParamValue::from_hex(s).unwrap()
    }

    fn setup() -> (ParameterRegistry, AccessControl) {
        let mut access = AccessControl::new(owner());
        access.set_vote_contract(&owner(), voter()).unwrap();

        let mut registry = ParameterRegistry::new();
        registry
            .add_param(
                &access,
                &owner(),
                UNIT_PRICE,
                "governance.unitprice".to_string(),
                false,
                value("0x05d21dba00"),
            )
            .unwrap();

        (registry, access)
    }

    #[test]
    fn test_add_param() {
        let (mut registry, access) = setup();

        registry
            .add_param(&access, &owner(), 13, "custom.mynewparam".to_string(), false, value("0x41414141"))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_param(13, 0).unwrap(), &value("0x41414141"));
        assert!(registry.param(13).unwrap().pending.is_none());
    }

    #[test]
    fn test_add_param_checks() {
        let (mut registry, access) = setup();

        let result = registry.add_param(&access, &voter(), 13, "x".to_string(), false, value("0x01"));
        assert!(matches!(result, Err(GovParamError::Access(AccessError::NotOwner))));

        let result = registry.add_param(&access, &owner(), 13, String::new(), false, value("0x01"));
        assert!(matches!(result, Err(GovParamError::Param(ParamError::EmptyName))));

        let result = registry.add_param(&access, &owner(), UNIT_PRICE, "dup".to_string(), false, value("0x01"));
        assert!(matches!(result, Err(GovParamError::Param(ParamError::ParamExists(UNIT_PRICE)))));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_param_waits_for_activation() {
        let (mut registry, access) = setup();

        let change = registry
            .set_param(&access, &owner(), UNIT_PRICE, value("0xae9f7bcc00"), 10_100, 100)
            .unwrap();
        assert_eq!(change.name, "governance.unitprice");
        assert_eq!(change.activation, 10_100);

        assert_eq!(registry.get_param(UNIT_PRICE, 100).unwrap(), &value("0x05d21dba00"));
        assert_eq!(registry.get_param(UNIT_PRICE, 10_099).unwrap(), &value("0x05d21dba00"));
        assert_eq!(registry.get_param(UNIT_PRICE, 10_100).unwrap(), &value("0xae9f7bcc00"));
        assert!(registry.param(UNIT_PRICE).unwrap().pending.is_none());
    }

    #[test]
    fn test_set_param_rejects_past_and_present() {
        let (mut registry, access) = setup();

        let result = registry.set_param(&access, &owner(), UNIT_PRICE, value("0x01"), 50, 100);
        assert!(matches!(
            result,
            Err(GovParamError::Param(ParamError::PastActivation { activation: 50, current: 100 }))
        ));

        let result = registry.set_param(&access, &owner(), UNIT_PRICE, value("0x01"), 100, 100);
        assert!(matches!(result, Err(GovParamError::Param(ParamError::PastActivation { .. }))));
    }

    #[test]
    fn test_one_pending_change_at_a_time() {
        let (mut registry, access) = setup();

        registry
            .set_param(&access, &owner(), UNIT_PRICE, value("0x01"), 200, 100)
            .unwrap();

        let result = registry.set_param(&access, &owner(), UNIT_PRICE, value("0x02"), 300, 150);
        assert!(matches!(
            result,
            Err(GovParamError::Param(ParamError::AlreadyPending { id: UNIT_PRICE, activation: 200 }))
        ));

        // Once the first change is due, a new schedule resolves it and succeeds
        registry
            .set_param(&access, &owner(), UNIT_PRICE, value("0x02"), 300, 200)
            .unwrap();
        let param = registry.param(UNIT_PRICE).unwrap();
        assert_eq!(param.value, value("0x01"));
        assert_eq!(param.pending.as_ref().unwrap().activation, 300);
    }

    #[test]
    fn test_set_param_permissions() {
        let (mut registry, access) = setup();
        let stranger = AccountId::from_bytes([9; 32]);

        // Not votable: vote contract refused
        let result = registry.set_param(&access, &voter(), UNIT_PRICE, value("0x01"), 200, 100);
        assert!(matches!(result, Err(GovParamError::Access(AccessError::PermissionDenied))));

        registry.set_param_votable(&access, &owner(), UNIT_PRICE, true).unwrap();

        let result = registry.set_param(&access, &stranger, UNIT_PRICE, value("0x01"), 200, 100);
        assert!(matches!(result, Err(GovParamError::Access(AccessError::PermissionDenied))));
        assert!(registry.param(UNIT_PRICE).unwrap().pending.is_none());

        registry
            .set_param(&access, &voter(), UNIT_PRICE, value("0x01"), 200, 100)
            .unwrap();
    }

    #[test]
    fn test_set_param_unknown_id() {
        let (mut registry, access) = setup();

        let result = registry.set_param(&access, &owner(), 100, value("0x01"), 200, 100);
        assert!(matches!(result, Err(GovParamError::Param(ParamError::NoSuchParam(100)))));

        // Unknown ids are not votable, so the vote contract is refused first
        let result = registry.set_param(&access, &voter(), 100, value("0x01"), 200, 100);
        assert!(matches!(result, Err(GovParamError::Access(AccessError::PermissionDenied))));
    }

    #[test]
    fn test_set_param_votable_keeps_pending() {
        let (mut registry, access) = setup();

        registry
            .set_param(&access, &owner(), UNIT_PRICE, value("0x01"), 200, 100)
            .unwrap();

        let result = registry.set_param_votable(&access, &voter(), UNIT_PRICE, true);
        assert!(matches!(result, Err(GovParamError::Access(AccessError::NotOwner))));

        let result = registry.set_param_votable(&access, &owner(), 42, true);
        assert!(matches!(result, Err(GovParamError::Param(ParamError::NoSuchParam(42)))));

        registry.set_param_votable(&access, &owner(), UNIT_PRICE, true).unwrap();
        registry.set_param_votable(&access, &owner(), UNIT_PRICE, false).unwrap();
        assert_eq!(registry.param(UNIT_PRICE).unwrap().pending.as_ref().unwrap().activation, 200);
    }

    #[test]
    fn test_scheduled_changes_applies_threshold() {
        let (mut registry, access) = setup();
        registry
            .add_param(&access, &owner(), 2, "istanbul.epoch".to_string(), false, value("0x093a80"))
            .unwrap();

        registry.set_param(&access, &owner(), UNIT_PRICE, value("0x01"), 500, 100).unwrap();
        registry.set_param(&access, &owner(), 2, value("0x015180"), 300, 100).unwrap();

        let changes = registry.scheduled_changes(100);
        assert_eq!(changes.len(), 2);
        // Ascending id, not activation order
        assert_eq!(changes[0].id, 2);
        assert_eq!(changes[0].name, "istanbul.epoch");
        assert_eq!(changes[1].id, UNIT_PRICE);

        // Height reached but slot not yet cleared by any read
        assert!(registry.param(2).unwrap().pending.is_some());
        let changes = registry.scheduled_changes(300);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, UNIT_PRICE);

        assert!(registry.scheduled_changes(500).is_empty());
    }

    #[test]
    fn test_get_all_params_resolves() {
        let (mut registry, access) = setup();
        registry
            .add_param(&access, &owner(), 0, "governance.governancemode".to_string(), false, value("0x73696e676c65"))
            .unwrap();
        registry
            .set_param(&access, &owner(), 0, value("0x62616c6c6f74"), 200, 100)
            .unwrap();

        let all = registry.get_all_params(150);
        assert_eq!(
            all,
            vec![
                ("governance.governancemode".to_string(), value("0x73696e676c65")),
                ("governance.unitprice".to_string(), value("0x05d21dba00")),
            ]
        );

        let all = registry.get_all_params(200);
        assert_eq!(all[0].1, value("0x62616c6c6f74"));
        assert!(registry.param(0).unwrap().pending.is_none());
    }

    #[test]
    fn test_value_at_does_not_mutate() {
        let (mut registry, access) = setup();
        registry
            .set_param(&access, &owner(), UNIT_PRICE, value("0x01"), 200, 100)
            .unwrap();

        let param = registry.param(UNIT_PRICE).unwrap();
        assert_eq!(param.value_at(199), &value("0x05d21dba00"));
        assert_eq!(param.value_at(200), &value("0x01"));
        assert!(param.pending.is_some());
    }

    #[test]
    fn test_resolve_all_counts() {
        let (mut registry, access) = setup();
        registry
            .add_param(&access, &owner(), 7, "reward.ratio".to_string(), false, value("0x33342f35342f3132"))
            .unwrap();
        registry.set_param(&access, &owner(), UNIT_PRICE, value("0x01"), 200, 100).unwrap();
        registry.set_param(&access, &owner(), 7, value("0x02"), 400, 100).unwrap();

        assert_eq!(registry.resolve_all(199), 0);
        assert_eq!(registry.resolve_all(250), 1);
        assert_eq!(registry.resolve_all(250), 0);
        assert_eq!(registry.resolve_all(1_000), 1);
    }
}
