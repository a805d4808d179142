//! Access Gate - admission checks evaluated before any mutation
//!
//! Three checks, all against the caller's current registry entry:
//!
//! - **OwnerOnly**: caller is an active member of the owner authority.
//! - **AuthorityOnly(selector)**: caller is active, and either belongs to the
//!   owner authority or its authority permits `selector` and has not expired.
//! - **SelfAuthorityOnly(target)**: caller is active, and either belongs to
//!   the owner authority or to `target` itself.
//!
//! A passing check yields an [`Admission`] naming the authority whose
//! threshold the caller votes under.

use crate::account_registry::AccountRegistry;
use crate::authority_store::AuthorityStore;
use authority_types::{
    AccountId, AuthorityError, AuthorityId, AuthorityRecord, AuthorityResult, GatedOperation,
    OperationSelector,
};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Which admission check guards a gated operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionCheck {
    OwnerOnly,
    AuthorityOnly(OperationSelector),
    SelfAuthorityOnly(AuthorityId),
}

impl AdmissionCheck {
    /// Authority-wide configuration is owner-gated; membership and threshold
    /// changes may also come from the target itself.
    pub fn for_operation(operation: &GatedOperation) -> Self {
        match operation {
            GatedOperation::CreateAuthority { .. }
            | GatedOperation::SetValidUntil { .. }
            | GatedOperation::GrantOperations { .. }
            | GatedOperation::RevokeOperations { .. } => AdmissionCheck::OwnerOnly,
            GatedOperation::SetThreshold { id, .. }
            | GatedOperation::AddMembers { id, .. }
            | GatedOperation::RemoveMembers { id, .. } => {
                AdmissionCheck::SelfAuthorityOnly(id.clone())
            }
            GatedOperation::Invoke { selector, .. } => {
                AdmissionCheck::AuthorityOnly(selector.clone())
            }
        }
    }
}

/// A caller that passed an admission check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admission {
    pub caller: AccountId,
    /// The caller's own authority (the voting authority)
    pub authority: AuthorityId,
    pub is_owner: bool,
}

/// Read-only view over the state needed to admit a caller
pub struct AccessGate<'a> {
    registry: &'a AccountRegistry,
    store: &'a AuthorityStore,
    owner: &'a AuthorityId,
}

impl<'a> AccessGate<'a> {
    pub fn new(registry: &'a AccountRegistry, store: &'a AuthorityStore, owner: &'a AuthorityId) -> Self {
        Self {
            registry,
            store,
            owner,
        }
    }

    /// Run the given check for `caller`
    pub fn check(
        &self,
        check: &AdmissionCheck,
        caller: &AccountId,
        now: DateTime<Utc>,
    ) -> AuthorityResult<Admission> {
        match check {
            AdmissionCheck::OwnerOnly => self.owner_only(caller),
            AdmissionCheck::AuthorityOnly(selector) => self.authority_only(caller, selector, now),
            AdmissionCheck::SelfAuthorityOnly(target) => self.self_authority_only(caller, target),
        }
    }

    /// Caller belongs to the owner authority and is not restricted
    pub fn owner_only(&self, caller: &AccountId) -> AuthorityResult<Admission> {
        let admission = self.admit(caller)?;
        if !admission.is_owner {
            warn!(caller = %caller, authority = %admission.authority, "Owner-only check failed");
            return Err(AuthorityError::denied(caller, "owner authority required"));
        }
        Ok(admission)
    }

    /// Caller may invoke `selector` at `now`.
    ///
    /// Expiry is checked before the selector so that every call from an
    /// expired authority reports `ExpiredAuthority`.
    pub fn authority_only(
        &self,
        caller: &AccountId,
        selector: &OperationSelector,
        now: DateTime<Utc>,
    ) -> AuthorityResult<Admission> {
        let admission = self.admit(caller)?;
        if admission.is_owner {
            return Ok(admission);
        }

        let record = self.store.live(&admission.authority)?;
        if !record.valid_until.is_valid_at(now) {
            warn!(
                caller = %caller,
                authority = %record.id,
                valid_until = %record.valid_until,
                "Authority expired"
            );
            return Err(AuthorityError::ExpiredAuthority(record.id.clone()));
        }
        if !record.permits(selector) {
            warn!(caller = %caller, authority = %record.id, selector = %selector, "Operation not permitted");
            return Err(AuthorityError::denied(
                caller,
                format!("authority {} may not call {}", record.id, selector),
            ));
        }
        Ok(admission)
    }

    /// Caller belongs to `target` or to the owner authority
    pub fn self_authority_only(&self, caller: &AccountId, target: &AuthorityId) -> AuthorityResult<Admission> {
        let admission = self.admit(caller)?;
        if !admission.is_owner && admission.authority != *target {
            warn!(caller = %caller, authority = %admission.authority, target = %target, "Self-authority check failed");
            return Err(AuthorityError::denied(
                caller,
                format!("not a member of {} or the owner authority", target),
            ));
        }
        Ok(admission)
    }

    /// Record of the authority an admitted caller votes under
    pub fn voting_authority(&self, admission: &Admission) -> AuthorityResult<&'a AuthorityRecord> {
        self.store.live(&admission.authority)
    }

    /// Common prefix of every check: assigned and not restricted
    fn admit(&self, caller: &AccountId) -> AuthorityResult<Admission> {
        let record = self.registry.lookup(caller);
        let authority = match record.authority_id {
            Some(id) => id,
            None => {
                warn!(caller = %caller, "Caller is not assigned to any authority");
                return Err(AuthorityError::denied(caller, "account is not assigned"));
            }
        };
        if record.restricted {
            warn!(caller = %caller, authority = %authority, "Caller is restricted");
            return Err(AuthorityError::denied(caller, "account is restricted"));
        }

        let is_owner = authority == *self.owner;
        Ok(Admission {
            caller: caller.clone(),
            authority,
            is_owner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authority_types::ValidUntil;
    use chrono::Duration;

    struct Fixture {
        registry: AccountRegistry,
        store: AuthorityStore,
        owner: AuthorityId,
        now: DateTime<Utc>,
    }

    fn setup() -> Fixture {
        let now = Utc::now();
        let mut registry = AccountRegistry::new();
        let mut store = AuthorityStore::new();
        let mut events = Vec::new();
        let owner = AuthorityId::owner();

        store
            .create(&mut registry, &owner, &[AccountId::new("root")], &[], 1, ValidUntil::Forever, now, &mut events)
            .unwrap();
        store
            .create(
                &mut registry,
                &AuthorityId::new("ops"),
                &[AccountId::new("op-1"), AccountId::new("op-2")],
                &["deploy".into()],
                1,
                ValidUntil::At(now + Duration::hours(1)),
                now,
                &mut events,
            )
            .unwrap();
        store
            .remove_members(&mut registry, &AuthorityId::new("ops"), &[AccountId::new("op-2")], &mut events)
            .unwrap();

        Fixture {
            registry,
            store,
            owner,
            now,
        }
    }

    #[test]
    fn test_owner_only() {
        let f = setup();
        let gate = AccessGate::new(&f.registry, &f.store, &f.owner);

        let admission = gate.owner_only(&AccountId::new("root")).unwrap();
        assert!(admission.is_owner);

        assert!(matches!(
            gate.owner_only(&AccountId::new("op-1")),
            Err(AuthorityError::PermissionDenied { .. })
        ));
        assert!(matches!(
            gate.owner_only(&AccountId::new("nobody")),
            Err(AuthorityError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_authority_only() {
        let f = setup();
        let gate = AccessGate::new(&f.registry, &f.store, &f.owner);
        let deploy: OperationSelector = "deploy".into();

        let admission = gate.authority_only(&AccountId::new("op-1"), &deploy, f.now).unwrap();
        assert_eq!(admission.authority, AuthorityId::new("ops"));

        assert!(matches!(
            gate.authority_only(&AccountId::new("op-1"), &"withdraw".into(), f.now),
            Err(AuthorityError::PermissionDenied { .. })
        ));

        // Owner bypasses the selector check
        assert!(gate.authority_only(&AccountId::new("root"), &"anything".into(), f.now).is_ok());

        // Restricted member
        assert!(matches!(
            gate.authority_only(&AccountId::new("op-2"), &deploy, f.now),
            Err(AuthorityError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_authority_only_expiry() {
        let f = setup();
        let gate = AccessGate::new(&f.registry, &f.store, &f.owner);
        let later = f.now + Duration::hours(2);

        assert!(matches!(
            gate.authority_only(&AccountId::new("op-1"), &"deploy".into(), later),
            Err(AuthorityError::ExpiredAuthority(id)) if id == AuthorityId::new("ops")
        ));

        // Exactly at the deadline is still valid
        let edge = f.now + Duration::hours(1);
        assert!(gate.authority_only(&AccountId::new("op-1"), &"deploy".into(), edge).is_ok());

        // Owner never expires
        assert!(gate.authority_only(&AccountId::new("root"), &"deploy".into(), later).is_ok());
    }

    #[test]
    fn test_check_for_operation() {
        let f = setup();
        let gate = AccessGate::new(&f.registry, &f.store, &f.owner);
        let ops = AuthorityId::new("ops");

        let grant = GatedOperation::GrantOperations {
            id: ops.clone(),
            operations: vec!["audit".into()],
        };
        assert_eq!(AdmissionCheck::for_operation(&grant), AdmissionCheck::OwnerOnly);
        assert!(gate
            .check(&AdmissionCheck::for_operation(&grant), &AccountId::new("op-1"), f.now)
            .is_err());

        let add = GatedOperation::AddMembers {
            id: ops.clone(),
            accounts: vec![AccountId::new("op-3")],
        };
        assert_eq!(
            AdmissionCheck::for_operation(&add),
            AdmissionCheck::SelfAuthorityOnly(ops)
        );
        assert!(gate
            .check(&AdmissionCheck::for_operation(&add), &AccountId::new("op-1"), f.now)
            .is_ok());
    }

    #[test]
    fn test_self_authority_only() {
        let f = setup();
        let gate = AccessGate::new(&f.registry, &f.store, &f.owner);
        let ops = AuthorityId::new("ops");

        assert!(gate.self_authority_only(&AccountId::new("op-1"), &ops).is_ok());
        assert!(gate.self_authority_only(&AccountId::new("root"), &ops).is_ok());
        assert!(matches!(
            gate.self_authority_only(&AccountId::new("op-1"), &f.owner),
            Err(AuthorityError::PermissionDenied { .. })
        ));
        assert!(matches!(
            gate.self_authority_only(&AccountId::new("op-2"), &ops),
            Err(AuthorityError::PermissionDenied { .. })
        ));
    }
}
