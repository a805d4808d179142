//! Authority Store - authority records and their invariants
//!
//! Every mutation validates the whole batch before touching any state, so a
//! failed call leaves both the store and the account registry unchanged.
//! Applied mutations push an [`AuthorityEvent`] onto the caller's buffer.

use crate::account_registry::AccountRegistry;
use authority_types::{
    AccountId, AuthorityError, AuthorityEvent, AuthorityId, AuthorityRecord, AuthorityResult,
    OperationSelector, ValidUntil,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Holds every authority record ever created
#[derive(Clone, Debug, Default)]
pub struct AuthorityStore {
    authorities: HashMap<AuthorityId, AuthorityRecord>,
}

impl AuthorityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an authority and assign all of its members
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        registry: &mut AccountRegistry,
        id: &AuthorityId,
        members: &[AccountId],
        operations: &[OperationSelector],
        threshold: u32,
        valid_until: ValidUntil,
        now: DateTime<Utc>,
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        if self.authorities.contains_key(id) {
            return Err(AuthorityError::AuthorityExists(id.clone()));
        }
        if members.is_empty() {
            return Err(AuthorityError::EmptyMembership(id.clone()));
        }
        let member_count = members.len() as u32;
        if threshold == 0 || threshold > member_count {
            return Err(AuthorityError::InvalidThreshold {
                threshold,
                member_count,
            });
        }
        check_batch_assignable(registry, id, members)?;

        for member in members {
            registry.assign(member, id)?;
        }

        let record = AuthorityRecord::new(id.clone(), member_count, threshold, now)
            .with_operations(operations.iter().cloned())
            .with_valid_until(valid_until);
        self.authorities.insert(id.clone(), record);

        info!(
            authority = %id,
            members = member_count,
            threshold = threshold,
            valid_until = %valid_until,
            "Authority created"
        );

        events.push(AuthorityEvent::AuthorityCreated {
            authority: id.clone(),
            members: members.to_vec(),
            operations: operations.to_vec(),
            threshold,
            valid_until,
        });
        Ok(())
    }

    /// Change the approval threshold, keeping `1 <= threshold <= member_count`
    pub fn set_threshold(
        &mut self,
        id: &AuthorityId,
        threshold: u32,
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        let record = self.live_mut(id)?;
        if threshold == 0 || threshold > record.member_count {
            return Err(AuthorityError::InvalidThreshold {
                threshold,
                member_count: record.member_count,
            });
        }

        record.threshold = threshold;
        info!(authority = %id, threshold = threshold, "Threshold changed");

        events.push(AuthorityEvent::ThresholdChanged {
            authority: id.clone(),
            threshold,
        });
        Ok(())
    }

    pub fn set_valid_until(
        &mut self,
        id: &AuthorityId,
        valid_until: ValidUntil,
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        let record = self.live_mut(id)?;
        record.valid_until = valid_until;

        info!(authority = %id, valid_until = %valid_until, "Validity changed");

        events.push(AuthorityEvent::ValidUntilChanged {
            authority: id.clone(),
            valid_until,
        });
        Ok(())
    }

    pub fn grant_operations(
        &mut self,
        id: &AuthorityId,
        operations: &[OperationSelector],
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        let record = self.live_mut(id)?;
        record.permitted_operations.extend(operations.iter().cloned());

        info!(authority = %id, operations = ?operations, "Operations granted");

        events.push(AuthorityEvent::OperationsGranted {
            authority: id.clone(),
            operations: operations.to_vec(),
        });
        Ok(())
    }

    pub fn revoke_operations(
        &mut self,
        id: &AuthorityId,
        operations: &[OperationSelector],
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        let record = self.live_mut(id)?;
        for op in operations {
            record.permitted_operations.remove(op);
        }

        info!(authority = %id, operations = ?operations, "Operations revoked");

        events.push(AuthorityEvent::OperationsRevoked {
            authority: id.clone(),
            operations: operations.to_vec(),
        });
        Ok(())
    }

    /// Add unassigned accounts as members (all or nothing)
    pub fn add_members(
        &mut self,
        registry: &mut AccountRegistry,
        id: &AuthorityId,
        accounts: &[AccountId],
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        self.live(id)?;
        if accounts.is_empty() {
            return Err(AuthorityError::EmptyMembership(id.clone()));
        }
        check_batch_assignable(registry, id, accounts)?;

        for account in accounts {
            registry.assign(account, id)?;
        }
        let record = self.live_mut(id)?;
        record.member_count += accounts.len() as u32;

        info!(
            authority = %id,
            added = accounts.len(),
            members = record.member_count,
            "Members added"
        );

        events.push(AuthorityEvent::MembersAdded {
            authority: id.clone(),
            accounts: accounts.to_vec(),
        });
        Ok(())
    }

    /// Restrict members and shrink the member count (all or nothing).
    ///
    /// The remaining count must stay positive and at or above the threshold;
    /// lower the threshold first to shrink further.
    pub fn remove_members(
        &mut self,
        registry: &mut AccountRegistry,
        id: &AuthorityId,
        accounts: &[AccountId],
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        let record = self.live(id)?;
        if accounts.is_empty() {
            return Err(AuthorityError::EmptyMembership(id.clone()));
        }

        let mut seen = HashSet::new();
        for account in accounts {
            let current = registry.lookup(account);
            if current.authority_id.as_ref() != Some(id) {
                return Err(AuthorityError::NotMember {
                    account: account.clone(),
                    authority: id.clone(),
                });
            }
            if current.restricted || !seen.insert(account) {
                return Err(AuthorityError::AccountRestricted(account.clone()));
            }
        }

        let removed = accounts.len() as u32;
        let remaining = record.member_count.saturating_sub(removed);
        if remaining == 0 || remaining < record.threshold {
            return Err(AuthorityError::InvariantViolation {
                authority: id.clone(),
                reason: format!(
                    "removing {} of {} members leaves {} below threshold {}",
                    removed, record.member_count, remaining, record.threshold
                ),
            });
        }

        for account in accounts {
            registry.restrict(account);
        }
        let record = self.live_mut(id)?;
        record.member_count = remaining;

        info!(authority = %id, removed = removed, members = remaining, "Members removed");

        events.push(AuthorityEvent::MembersRemoved {
            authority: id.clone(),
            accounts: accounts.to_vec(),
        });
        Ok(())
    }

    // --- Query methods ---

    pub fn get(&self, id: &AuthorityId) -> Option<&AuthorityRecord> {
        self.authorities.get(id)
    }

    pub fn contains(&self, id: &AuthorityId) -> bool {
        self.authorities.contains_key(id)
    }

    /// A record that exists and still has members
    pub fn live(&self, id: &AuthorityId) -> AuthorityResult<&AuthorityRecord> {
        self.authorities
            .get(id)
            .filter(|r| r.is_live())
            .ok_or_else(|| AuthorityError::UnknownAuthority(id.clone()))
    }

    fn live_mut(&mut self, id: &AuthorityId) -> AuthorityResult<&mut AuthorityRecord> {
        self.authorities
            .get_mut(id)
            .filter(|r| r.is_live())
            .ok_or_else(|| AuthorityError::UnknownAuthority(id.clone()))
    }

    pub fn ids(&self) -> Vec<&AuthorityId> {
        let mut ids: Vec<&AuthorityId> = self.authorities.keys().collect();
        ids.sort();
        ids
    }

    pub fn records(&self) -> impl Iterator<Item = &AuthorityRecord> {
        self.authorities.values()
    }

    pub fn len(&self) -> usize {
        self.authorities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }
}

/// Every account is assignable and none is listed twice
fn check_batch_assignable(
    registry: &AccountRegistry,
    id: &AuthorityId,
    accounts: &[AccountId],
) -> AuthorityResult<()> {
    let mut seen = HashSet::new();
    for account in accounts {
        registry.check_assignable(account)?;
        if !seen.insert(account) {
            return Err(AuthorityError::AlreadyAssigned {
                account: account.clone(),
                authority: id.clone(),
            });
        }
    }
    Ok(())
}
