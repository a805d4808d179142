//! Account Registry - which authority each account belongs to
//!
//! An account belongs to at most one authority for its whole life.
//! Restriction is a soft delete: the authority id is retained.

use authority_types::{AccountId, AccountRecord, AuthorityError, AuthorityId, AuthorityResult};
use std::collections::HashMap;
use tracing::debug;

/// Maps accounts to their authority and restricted flag
#[derive(Clone, Debug, Default)]
pub struct AccountRegistry {
    accounts: HashMap<AccountId, AccountRecord>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an unassigned account to an authority
    pub fn assign(&mut self, account: &AccountId, authority: &AuthorityId) -> AuthorityResult<()> {
        self.check_assignable(account)?;

        self.accounts
            .insert(account.clone(), AccountRecord::assigned(authority.clone()));
        debug!(account = %account, authority = %authority, "Account assigned");
        Ok(())
    }

    /// Fails unless `account` could be assigned right now
    pub fn check_assignable(&self, account: &AccountId) -> AuthorityResult<()> {
        let record = self.lookup(account);
        if let Some(existing) = record.authority_id {
            return Err(AuthorityError::AlreadyAssigned {
                account: account.clone(),
                authority: existing,
            });
        }
        if record.restricted {
            return Err(AuthorityError::AccountRestricted(account.clone()));
        }
        Ok(())
    }

    /// Bar an account from every admission check, keeping its authority id
    pub fn restrict(&mut self, account: &AccountId) {
        self.accounts.entry(account.clone()).or_default().restricted = true;
        debug!(account = %account, "Account restricted");
    }

    /// Current record; unknown accounts read as unassigned
    pub fn lookup(&self, account: &AccountId) -> AccountRecord {
        self.accounts.get(account).cloned().unwrap_or_default()
    }

    pub fn is_active_member(&self, account: &AccountId, authority: &AuthorityId) -> bool {
        self.accounts
            .get(account)
            .map(|r| r.is_active_in(authority))
            .unwrap_or(false)
    }

    /// Active (non-restricted) members of an authority, sorted
    pub fn active_members(&self, authority: &AuthorityId) -> Vec<AccountId> {
        let mut members: Vec<AccountId> = self
            .accounts
            .iter()
            .filter(|(_, r)| r.is_active_in(authority))
            .map(|(id, _)| id.clone())
            .collect();
        members.sort();
        members
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (AccountRegistry, AccountId, AuthorityId) {
        (
            AccountRegistry::new(),
            AccountId::new("alice"),
            AuthorityId::new("ops"),
        )
    }

    #[test]
    fn test_assign_and_lookup() {
        let (mut registry, alice, ops) = setup();

        assert!(!registry.lookup(&alice).is_assigned());
        registry.assign(&alice, &ops).unwrap();

        let record = registry.lookup(&alice);
        assert_eq!(record.authority_id, Some(ops.clone()));
        assert!(!record.restricted);
        assert!(registry.is_active_member(&alice, &ops));
    }

    #[test]
    fn test_assign_twice_fails() {
        let (mut registry, alice, ops) = setup();
        registry.assign(&alice, &ops).unwrap();

        let result = registry.assign(&alice, &AuthorityId::new("other"));
        assert!(matches!(
            result,
            Err(AuthorityError::AlreadyAssigned { authority, .. }) if authority == ops
        ));
    }

    #[test]
    fn test_restrict_keeps_authority() {
        let (mut registry, alice, ops) = setup();
        registry.assign(&alice, &ops).unwrap();
        registry.restrict(&alice);

        let record = registry.lookup(&alice);
        assert_eq!(record.authority_id, Some(ops.clone()));
        assert!(record.restricted);
        assert!(!registry.is_active_member(&alice, &ops));
        assert!(registry.active_members(&ops).is_empty());

        // Never reassignable
        assert!(matches!(
            registry.assign(&alice, &AuthorityId::new("other")),
            Err(AuthorityError::AlreadyAssigned { .. })
        ));
    }

    #[test]
    fn test_restricted_unassigned_cannot_be_assigned() {
        let (mut registry, alice, ops) = setup();
        registry.restrict(&alice);

        assert!(matches!(
            registry.assign(&alice, &ops),
            Err(AuthorityError::AccountRestricted(_))
        ));
    }

    #[test]
    fn test_active_members_sorted() {
        let mut registry = AccountRegistry::new();
        let ops = AuthorityId::new("ops");
        for name in ["carol", "alice", "bob"] {
            registry.assign(&AccountId::new(name), &ops).unwrap();
        }
        registry
            .assign(&AccountId::new("dave"), &AuthorityId::new("other"))
            .unwrap();

        let members = registry.active_members(&ops);
        assert_eq!(
            members,
            vec![
                AccountId::new("alice"),
                AccountId::new("bob"),
                AccountId::new("carol")
            ]
        );
        assert_eq!(registry.len(), 4);
    }
}
