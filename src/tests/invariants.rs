// Invariant Tests - properties of the parameter store under arbitrary inputs
//
// 1. Parameter ids are unique
// 2. At most one pending change per parameter
// 3. Lazy resolution is idempotent
// 4. Activation is monotonic in the block height
// 5. The validator set never empties
// 6. The permission gate is symmetric in owner / vote contract / stranger

use crate::contracts::{AccessError, GovParamContract, GovParamError, ParamError};
use crate::consensus::ValidatorError;
use crate::types::{AccountId, BlockNumber, ParamId, ParamValue};
use proptest::prelude::*;

fn create_account(seed: u8) -> AccountId {
    AccountId::from_bytes([seed; 32])
}

fn owner() -> AccountId {
    create_account(1)
}

fn voter() -> AccountId {
    create_account(2)
}

fn stranger() -> AccountId {
    create_account(3)
}

/// Store with a vote contract and one parameter (id 7)
fn store_with_param(votable: bool, initial: ParamValue) -> GovParamContract {
    let mut gp = GovParamContract::new(owner(), vec![owner()]).unwrap();
    gp.set_vote_contract(&owner(), voter()).unwrap();
    gp.add_param(&owner(), 7, "istanbul.committeesize".to_string(), votable, initial)
        .unwrap();
    gp.drain_events();
    gp
}

fn param_value() -> impl Strategy<Value = ParamValue> {
    prop::collection::vec(any::<u8>(), 0..16).prop_map(ParamValue::from)
}

/// (current, activation) with current < activation
fn schedule() -> impl Strategy<Value = (BlockNumber, BlockNumber)> {
    (0u64..1_000_000, 1u64..100_000).prop_map(|(current, delay)| (current, current + delay))
}

#[cfg(test)]
mod invariant_params {
    use super::*;

    proptest! {
        #[test]
        fn prop_param_ids_unique(
            id in any::<ParamId>(),
            first in param_value(),
            second in param_value(),
            votable in any::<bool>(),
        ) {
            let mut gp = GovParamContract::new(owner(), vec![owner()]).unwrap();
            gp.add_param(&owner(), id, "first".to_string(), votable, first.clone()).unwrap();

            let result = gp.add_param(&owner(), id, "second".to_string(), !votable, second);
            prop_assert_eq!(result, Err(GovParamError::Param(ParamError::ParamExists(id))));
            prop_assert_eq!(gp.param_count(), 1);
            prop_assert_eq!(gp.get_param(id, 0).unwrap(), &first);
        }

        #[test]
        fn prop_at_most_one_pending(
            (current, activation) in schedule(),
            offset in 0u64..100_000,
            extra in 1u64..100_000,
            new_value in param_value(),
        ) {
            let mut gp = store_with_param(true, ParamValue::from(vec![0x01]));
            gp.set_param(&owner(), 7, new_value, activation, current).unwrap();

            // Any later call still before activation
            let later = current + offset % (activation - current);
            let result = gp.set_param(&owner(), 7, ParamValue::from(vec![0x02]), later + extra, later);
            prop_assert_eq!(
                result,
                Err(GovParamError::Param(ParamError::AlreadyPending { id: 7, activation }))
            );
            prop_assert_eq!(gp.scheduled_changes(later).len(), 1);
        }

        #[test]
        fn prop_resolution_idempotent(
            (current, activation) in schedule(),
            reads in prop::collection::vec(0u64..1_000_000, 1..8),
            new_value in param_value(),
        ) {
            let mut gp = store_with_param(false, ParamValue::from(vec![0x01]));
            gp.set_param(&owner(), 7, new_value.clone(), activation, current).unwrap();

            let mut height = activation;
            for step in reads {
                height += step;
                prop_assert_eq!(gp.get_param(7, height).unwrap(), &new_value);
                prop_assert!(gp.scheduled_changes(height).is_empty());
            }
            prop_assert!(gp.param(7).unwrap().pending.is_none());
        }

        #[test]
        fn prop_activation_monotonic(
            (current, activation) in schedule(),
            probe in any::<u64>(),
            old_value in param_value(),
            new_value in param_value(),
        ) {
            let mut gp = store_with_param(true, old_value.clone());
            gp.set_param(&owner(), 7, new_value.clone(), activation, current).unwrap();

            // Probe heights from the scheduling block onwards, each on a fresh copy
            let height = current + probe % (2 * (activation - current) + 1);
            let mut view = gp.clone();
            let observed = view.get_param(7, height).unwrap().clone();

            if height < activation {
                prop_assert_eq!(observed, old_value);
                prop_assert_eq!(view.scheduled_changes(height).len(), 1);
            } else {
                prop_assert_eq!(observed, new_value);
                prop_assert!(view.scheduled_changes(height).is_empty());
            }
        }
    }
}

#[cfg(test)]
mod invariant_validators {
    use super::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (10u8..20).prop_map(Op::Add),
            (10u8..20).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_validator_set_never_empty(ops in prop::collection::vec(op(), 1..64)) {
            let mut gp = GovParamContract::new(owner(), vec![create_account(10)]).unwrap();
            let mut model = vec![create_account(10)];

            for op in ops {
                match op {
                    Op::Add(seed) => {
                        let account = create_account(seed);
                        let result = gp.add_validator(&owner(), account);
                        if model.contains(&account) {
                            prop_assert_eq!(
                                result,
                                Err(GovParamError::Validator(ValidatorError::ValidatorExists(account)))
                            );
                        } else {
                            prop_assert!(result.is_ok());
                            model.push(account);
                        }
                    }
                    Op::Remove(seed) => {
                        let account = create_account(seed);
                        let result = gp.remove_validator(&owner(), account);
                        match model.iter().position(|v| *v == account) {
                            None => prop_assert_eq!(
                                result,
                                Err(GovParamError::Validator(ValidatorError::NoSuchValidator(account)))
                            ),
                            Some(_) if model.len() == 1 => prop_assert_eq!(
                                result,
                                Err(GovParamError::Validator(ValidatorError::AtLeastOneValidatorRequired))
                            ),
                            Some(idx) => {
                                prop_assert!(result.is_ok());
                                model.swap_remove(idx);
                            }
                        }
                    }
                }

                prop_assert!(!gp.get_validators().is_empty());
                prop_assert_eq!(gp.get_validators(), model.as_slice());
            }
        }
    }
}

#[cfg(test)]
mod invariant_gate {
    use super::*;

    fn caller() -> impl Strategy<Value = AccountId> {
        prop_oneof![Just(owner()), Just(voter()), Just(stranger())]
    }

    proptest! {
        #[test]
        fn prop_set_param_gate(
            votable in any::<bool>(),
            caller in caller(),
            (current, activation) in schedule(),
        ) {
            let mut gp = store_with_param(votable, ParamValue::from(vec![0x01]));
            let result = gp.set_param(&caller, 7, ParamValue::from(vec![0x02]), activation, current);

            let allowed = caller == owner() || (caller == voter() && votable);
            if allowed {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(GovParamError::Access(AccessError::PermissionDenied)));
                prop_assert!(gp.param(7).unwrap().pending.is_none());
                prop_assert!(gp.events().is_empty());
            }
        }

        #[test]
        fn prop_validator_gate(votable in any::<bool>(), caller in caller()) {
            let mut gp = GovParamContract::new(owner(), vec![owner()]).unwrap();
            gp.set_vote_contract(&owner(), voter()).unwrap();
            gp.set_update_vals_votable(&owner(), votable).unwrap();

            let allowed = caller == owner() || (caller == voter() && votable);

            let added = gp.add_validator(&caller, create_account(10));
            prop_assert_eq!(added.is_ok(), allowed);

            // Stay above one member so only the gate can reject
            gp.add_validator(&owner(), create_account(11)).unwrap();
            let removed = gp.remove_validator(&caller, create_account(11));
            prop_assert_eq!(removed.is_ok(), allowed);
            if !allowed {
                prop_assert_eq!(removed, Err(GovParamError::Access(AccessError::PermissionDenied)));
            }
        }

        #[test]
        fn prop_admin_calls_owner_only(caller in caller(), flag in any::<bool>()) {
            let mut gp = store_with_param(true, ParamValue::from(vec![0x01]));
            let is_owner = caller == owner();

            prop_assert_eq!(gp.set_param_votable(&caller, 7, flag).is_ok(), is_owner);
            prop_assert_eq!(gp.set_update_vals_votable(&caller, flag).is_ok(), is_owner);
            prop_assert_eq!(
                gp.add_param(&caller, 8, "reward.ratio".to_string(), flag, ParamValue::default()).is_ok(),
                is_owner
            );
            prop_assert_eq!(gp.set_vote_contract(&caller, stranger()).is_ok(), is_owner);
        }
    }
}
