//! Property tests: threshold invariants hold under arbitrary call sequences,
//! and exactly `t` distinct votes approve a `t`-threshold operation.

use authority_runtime::{AuthorityAdmin, ManualClock};
use authority_types::{AccountId, AuthorityConfig, AuthorityError, AuthorityId, GatedOperation};
use proptest::prelude::*;
use std::sync::Arc;

const OWNER_MEMBERS: usize = 5;

fn member(i: usize) -> AccountId {
    AccountId::new(format!("m{}", i))
}

fn admin_with(members: usize, threshold: u32) -> AuthorityAdmin {
    let config = AuthorityConfig::new((0..members).map(member).collect(), threshold);
    AuthorityAdmin::initialize(&config, Arc::new(ManualClock::default())).unwrap()
}

/// A reconfiguration call against the owner authority
#[derive(Clone, Debug)]
enum Call {
    SetThreshold { caller: usize, threshold: u32 },
    Remove { caller: usize, target: usize },
    Add { caller: usize, fresh: usize },
}

fn call_strategy() -> impl Strategy<Value = Call> {
    prop_oneof![
        (0..OWNER_MEMBERS + 3, 0u32..8)
            .prop_map(|(caller, threshold)| Call::SetThreshold { caller, threshold }),
        (0..OWNER_MEMBERS + 3, 0..OWNER_MEMBERS + 3)
            .prop_map(|(caller, target)| Call::Remove { caller, target }),
        (0..OWNER_MEMBERS + 3, 0..3usize).prop_map(|(caller, fresh)| Call::Add { caller, fresh }),
    ]
}

proptest! {
    /// `member_count >= threshold >= 1` after every call, successful or not.
    #[test]
    fn threshold_invariant_always_holds(
        initial_threshold in 1u32..=OWNER_MEMBERS as u32,
        calls in prop::collection::vec(call_strategy(), 0..40),
    ) {
        let mut admin = admin_with(OWNER_MEMBERS, initial_threshold);
        let owner = AuthorityId::owner();

        for call in calls {
            let _ = match call {
                Call::SetThreshold { caller, threshold } => {
                    admin.set_threshold(&member(caller), owner.clone(), threshold)
                }
                Call::Remove { caller, target } => {
                    admin.remove_members(&member(caller), owner.clone(), vec![member(target)])
                }
                Call::Add { caller, fresh } => admin.add_members(
                    &member(caller),
                    owner.clone(),
                    vec![member(OWNER_MEMBERS + fresh)],
                ),
            };

            let record = admin.authority(&owner).unwrap();
            prop_assert!(record.member_count > 0);
            prop_assert!(record.threshold >= 1);
            prop_assert!(record.threshold <= record.member_count);
            prop_assert_eq!(
                admin.active_members(&owner).len() as u32,
                record.member_count
            );

            for (_, pending) in admin.pending_for(&owner) {
                let mut approvers = pending.approvers.clone();
                approvers.sort();
                approvers.dedup();
                prop_assert_eq!(approvers.len(), pending.approvers.len());
            }
        }
    }

    /// The t-th distinct vote approves; the (t-1)-th leaves t-1 pending.
    #[test]
    fn exactly_threshold_votes_approve(
        members in 1usize..8,
        threshold_seed in 0u32..8,
        new_threshold_seed in 0u32..8,
    ) {
        let threshold = threshold_seed % members as u32 + 1;
        let new_threshold = new_threshold_seed % members as u32 + 1;
        let mut admin = admin_with(members, threshold);
        let owner = AuthorityId::owner();
        let op = GatedOperation::SetThreshold { id: owner.clone(), threshold: new_threshold };

        for i in 0..threshold as usize - 1 {
            let approved = admin.set_threshold(&member(i), owner.clone(), new_threshold).unwrap();
            prop_assert!(!approved);
            prop_assert_eq!(admin.pending_count(&owner, &op).unwrap(), i + 1);
        }

        let last = threshold as usize - 1;
        let approved = admin.set_threshold(&member(last), owner.clone(), new_threshold).unwrap();
        prop_assert!(approved);
        prop_assert_eq!(admin.pending_count(&owner, &op).unwrap(), 0);
        prop_assert_eq!(admin.authority(&owner).unwrap().threshold, new_threshold);
    }

    /// Re-voting from the same account never moves the count.
    #[test]
    fn duplicate_votes_are_rejected(repeats in 1usize..6) {
        let mut admin = admin_with(3, 3);
        let owner = AuthorityId::owner();
        let op = GatedOperation::SetThreshold { id: owner.clone(), threshold: 1 };

        prop_assert!(!admin.set_threshold(&member(0), owner.clone(), 1).unwrap());
        for _ in 0..repeats {
            let result = admin.set_threshold(&member(0), owner.clone(), 1);
            prop_assert!(matches!(result, Err(AuthorityError::DuplicateApproval { .. })), "expected duplicate approval error");
            prop_assert_eq!(admin.pending_count(&owner, &op).unwrap(), 1);
        }
    }
}
