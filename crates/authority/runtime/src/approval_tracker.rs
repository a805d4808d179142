//! Approval Tracker - N-of-M approval per operation fingerprint
//!
//! Each `(authority, fingerprint)` pair has at most one pending entry. A vote
//! either joins the pending set or, when it brings the count to the voting
//! authority's threshold, clears the entry and reports approval. The next
//! call with the same fingerprint starts a fresh track.
//!
//! The tracker only reports whether approval was reached. Callers must not
//! apply the gated mutation unless [`VoteResult::is_approved`] is true.

use crate::account_registry::AccountRegistry;
use authority_types::{
    AccountId, AuthorityError, AuthorityEvent, AuthorityId, AuthorityRecord, AuthorityResult,
    Fingerprint, GatedOperation, OperationSelector,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Votes collected so far for one fingerprint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingApproval {
    pub selector: OperationSelector,
    /// Distinct approvers in arrival order
    pub approvers: Vec<AccountId>,
    pub opened_at: DateTime<Utc>,
}

impl PendingApproval {
    pub fn vote_count(&self) -> usize {
        self.approvers.len()
    }

    pub fn has_voted(&self, account: &AccountId) -> bool {
        self.approvers.contains(account)
    }
}

/// Result of casting a vote
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteResult {
    /// Vote stored, threshold not yet met; the gated mutation must not run
    Recorded { votes: u32, threshold: u32 },
    /// Threshold met; the pending set was cleared and the mutation may run
    Approved,
}

impl VoteResult {
    pub fn is_approved(&self) -> bool {
        matches!(self, VoteResult::Approved)
    }
}

/// Pending approvals keyed by `(authority, fingerprint)`
#[derive(Clone, Debug, Default)]
pub struct ApprovalTracker {
    pending: HashMap<(AuthorityId, Fingerprint), PendingApproval>,
}

impl ApprovalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cast `voter`'s vote on `operation` within `authority`.
    ///
    /// Approvers that are no longer active members of `authority` are dropped
    /// before counting. A repeated vote fails with `DuplicateApproval` and
    /// changes nothing.
    pub fn vote(
        &mut self,
        registry: &AccountRegistry,
        authority: &AuthorityRecord,
        operation: &GatedOperation,
        voter: &AccountId,
        now: DateTime<Utc>,
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<VoteResult> {
        let fingerprint = operation.fingerprint()?;
        let selector = operation.selector();
        let key = (authority.id.clone(), fingerprint);

        let (mut approvers, opened_at) = match self.pending.get(&key) {
            Some(pending) => (pending.approvers.clone(), pending.opened_at),
            None => (Vec::new(), now),
        };
        approvers.retain(|a| registry.is_active_member(a, &authority.id));

        if approvers.contains(voter) {
            return Err(AuthorityError::DuplicateApproval {
                voter: voter.clone(),
                selector,
            });
        }

        let votes = approvers.len() as u32 + 1;
        let threshold = authority.threshold;

        if votes >= threshold {
            self.pending.remove(&key);

            info!(
                authority = %authority.id,
                selector = %selector,
                fingerprint = %fingerprint,
                voter = %voter,
                "Approval reached"
            );

            events.push(AuthorityEvent::ApprovalReached {
                authority: authority.id.clone(),
                selector,
                fingerprint,
                voter: voter.clone(),
            });
            return Ok(VoteResult::Approved);
        }

        approvers.push(voter.clone());
        self.pending.insert(
            key,
            PendingApproval {
                selector: selector.clone(),
                approvers,
                opened_at,
            },
        );

        debug!(
            authority = %authority.id,
            selector = %selector,
            fingerprint = %fingerprint,
            voter = %voter,
            votes = votes,
            threshold = threshold,
            "Approval recorded"
        );

        events.push(AuthorityEvent::ApprovalRecorded {
            authority: authority.id.clone(),
            selector,
            fingerprint,
            voter: voter.clone(),
            votes,
            threshold,
        });
        Ok(VoteResult::Recorded { votes, threshold })
    }

    // --- Query methods ---

    pub fn pending(&self, authority: &AuthorityId, fingerprint: &Fingerprint) -> Option<&PendingApproval> {
        self.pending.get(&(authority.clone(), *fingerprint))
    }

    /// Votes currently held for a fingerprint (0 when absent)
    pub fn pending_count(&self, authority: &AuthorityId, fingerprint: &Fingerprint) -> usize {
        self.pending(authority, fingerprint)
            .map(|p| p.vote_count())
            .unwrap_or(0)
    }

    /// Every open track of an authority
    pub fn pending_for(&self, authority: &AuthorityId) -> Vec<(&Fingerprint, &PendingApproval)> {
        self.pending
            .iter()
            .filter(|((id, _), _)| id == authority)
            .map(|((_, fp), p)| (fp, p))
            .collect()
    }

    /// Number of open tracks across all authorities
    pub fn open_count(&self) -> usize {
        self.pending.len()
    }
}
