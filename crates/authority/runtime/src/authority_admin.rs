//! Authority Admin - the gated operations and the engine's entry point
//!
//! Every gated call has the same shape: admission check, vote on the call's
//! fingerprint, and only if the vote reached the threshold, apply the
//! mutation. A call that is not yet approved returns `Ok(false)` with its
//! vote persisted.
//!
//! Calls are atomic. Each one runs against a staged copy of the state with
//! its own event buffer; the copy replaces the live state and the events are
//! published only when the call returns `Ok`. On error nothing changes,
//! including the vote that would otherwise have been recorded.

use crate::access_gate::{AccessGate, AdmissionCheck};
use crate::account_registry::AccountRegistry;
use crate::approval_tracker::{ApprovalTracker, PendingApproval};
use crate::authority_store::AuthorityStore;
use crate::clock::{Clock, SystemClock};
use crate::notification::NotificationSink;
use authority_types::{
    AccountId, AccountRecord, AuthorityConfig, AuthorityEvent, AuthorityId, AuthorityNotice,
    AuthorityRecord, AuthorityResult, Fingerprint, GatedOperation, NoticeJournal,
    OperationSelector, ValidUntil,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// All mutable engine state, owned by [`AuthorityAdmin`]
#[derive(Clone, Debug)]
pub struct AuthorityState {
    registry: AccountRegistry,
    store: AuthorityStore,
    tracker: ApprovalTracker,
    owner: AuthorityId,
}

impl AuthorityState {
    /// Gate, vote, and (if approved) mutate
    fn submit(
        &mut self,
        caller: &AccountId,
        operation: &GatedOperation,
        now: DateTime<Utc>,
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<bool> {
        let gate = AccessGate::new(&self.registry, &self.store, &self.owner);
        let admission = gate.check(&AdmissionCheck::for_operation(operation), caller, now)?;

        if let Some(target) = operation.target() {
            if !matches!(operation, GatedOperation::CreateAuthority { .. }) {
                self.store.live(target)?;
            }
        }

        let voting = gate.voting_authority(&admission)?.clone();
        let vote = self
            .tracker
            .vote(&self.registry, &voting, operation, caller, now, events)?;
        if !vote.is_approved() {
            return Ok(false);
        }

        self.apply(operation, now, events)?;
        Ok(true)
    }

    /// Apply an approved operation to the store
    fn apply(
        &mut self,
        operation: &GatedOperation,
        now: DateTime<Utc>,
        events: &mut Vec<AuthorityEvent>,
    ) -> AuthorityResult<()> {
        match operation {
            GatedOperation::CreateAuthority {
                id,
                members,
                operations,
                valid_until,
                threshold,
            } => self.store.create(
                &mut self.registry,
                id,
                members,
                operations,
                *threshold,
                *valid_until,
                now,
                events,
            ),
            GatedOperation::SetValidUntil { id, valid_until } => {
                self.store.set_valid_until(id, *valid_until, events)
            }
            GatedOperation::GrantOperations { id, operations } => {
                self.store.grant_operations(id, operations, events)
            }
            GatedOperation::RevokeOperations { id, operations } => {
                self.store.revoke_operations(id, operations, events)
            }
            GatedOperation::SetThreshold { id, threshold } => {
                self.store.set_threshold(id, *threshold, events)
            }
            GatedOperation::AddMembers { id, accounts } => {
                self.store.add_members(&mut self.registry, id, accounts, events)
            }
            GatedOperation::RemoveMembers { id, accounts } => {
                self.store.remove_members(&mut self.registry, id, accounts, events)
            }
            // Dispatched by the host once approved
            GatedOperation::Invoke { .. } => Ok(()),
        }
    }
}

/// The threshold authority engine.
///
/// Owns the state container, the injected clock, the notice journal, and the
/// registered notification sinks. Operations are strictly sequential
/// (`&mut self`).
pub struct AuthorityAdmin {
    state: AuthorityState,
    clock: Arc<dyn Clock>,
    journal: NoticeJournal,
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl AuthorityAdmin {
    /// Create the owner authority from `config` and start the engine
    pub fn initialize(config: &AuthorityConfig, clock: Arc<dyn Clock>) -> AuthorityResult<Self> {
        Self::initialize_with_sinks(config, clock, Vec::new())
    }

    /// Initialize with the system clock
    pub fn with_system_clock(config: &AuthorityConfig) -> AuthorityResult<Self> {
        Self::initialize(config, Arc::new(SystemClock))
    }

    /// Initialize with sinks that also receive the owner's creation notice
    pub fn initialize_with_sinks(
        config: &AuthorityConfig,
        clock: Arc<dyn Clock>,
        sinks: Vec<Box<dyn NotificationSink>>,
    ) -> AuthorityResult<Self> {
        config.validate()?;

        let now = clock.now();
        let mut state = AuthorityState {
            registry: AccountRegistry::new(),
            store: AuthorityStore::new(),
            tracker: ApprovalTracker::new(),
            owner: config.owner_authority.clone(),
        };
        let mut events = Vec::new();

        state.store.create(
            &mut state.registry,
            &config.owner_authority,
            &config.owner_members,
            &config.owner_operations,
            config.owner_threshold,
            ValidUntil::Forever,
            now,
            &mut events,
        )?;

        info!(
            owner = %config.owner_authority,
            members = config.owner_members.len(),
            threshold = config.owner_threshold,
            "Authority engine initialized"
        );

        let mut admin = Self {
            state,
            clock,
            journal: NoticeJournal::new(),
            sinks,
        };
        admin.publish(None, events, now);
        Ok(admin)
    }

    /// Register an additional sink for future notices
    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    // =========================================================================
    // GATED OPERATIONS
    // =========================================================================

    /// Create a new authority (owner-gated)
    pub fn create_authority(
        &mut self,
        caller: &AccountId,
        id: AuthorityId,
        members: Vec<AccountId>,
        operations: Vec<OperationSelector>,
        valid_until: ValidUntil,
        threshold: u32,
    ) -> AuthorityResult<bool> {
        self.submit(
            caller,
            GatedOperation::CreateAuthority {
                id,
                members,
                operations,
                valid_until,
                threshold,
            },
        )
    }

    /// Change an authority's expiry (owner-gated)
    pub fn set_valid_until(
        &mut self,
        caller: &AccountId,
        id: AuthorityId,
        valid_until: ValidUntil,
    ) -> AuthorityResult<bool> {
        self.submit(caller, GatedOperation::SetValidUntil { id, valid_until })
    }

    /// Add selectors to an authority's permitted set (owner-gated)
    pub fn grant_operations(
        &mut self,
        caller: &AccountId,
        id: AuthorityId,
        operations: Vec<OperationSelector>,
    ) -> AuthorityResult<bool> {
        self.submit(caller, GatedOperation::GrantOperations { id, operations })
    }

    /// Remove selectors from an authority's permitted set (owner-gated)
    pub fn revoke_operations(
        &mut self,
        caller: &AccountId,
        id: AuthorityId,
        operations: Vec<OperationSelector>,
    ) -> AuthorityResult<bool> {
        self.submit(caller, GatedOperation::RevokeOperations { id, operations })
    }

    /// Change an authority's threshold (self- or owner-gated)
    pub fn set_threshold(
        &mut self,
        caller: &AccountId,
        id: AuthorityId,
        threshold: u32,
    ) -> AuthorityResult<bool> {
        self.submit(caller, GatedOperation::SetThreshold { id, threshold })
    }

    /// Add members to an authority (self- or owner-gated)
    pub fn add_members(
        &mut self,
        caller: &AccountId,
        id: AuthorityId,
        accounts: Vec<AccountId>,
    ) -> AuthorityResult<bool> {
        self.submit(caller, GatedOperation::AddMembers { id, accounts })
    }

    /// Remove (restrict) members of an authority (self- or owner-gated)
    pub fn remove_members(
        &mut self,
        caller: &AccountId,
        id: AuthorityId,
        accounts: Vec<AccountId>,
    ) -> AuthorityResult<bool> {
        self.submit(caller, GatedOperation::RemoveMembers { id, accounts })
    }

    /// Approve a business operation identified by `selector` and `payload`.
    ///
    /// Returns `true` once the caller's authority has reached its threshold
    /// for this exact payload; the host then dispatches the operation.
    pub fn authorize(
        &mut self,
        caller: &AccountId,
        selector: OperationSelector,
        payload: Vec<u8>,
    ) -> AuthorityResult<bool> {
        self.submit(caller, GatedOperation::Invoke { selector, payload })
    }

    /// Submit any gated operation atomically
    pub fn submit(&mut self, caller: &AccountId, operation: GatedOperation) -> AuthorityResult<bool> {
        let now = self.clock.now();
        let selector = operation.selector();
        let mut staged = self.state.clone();
        let mut events = Vec::new();

        match staged.submit(caller, &operation, now, &mut events) {
            Ok(applied) => {
                self.state = staged;
                if applied {
                    info!(caller = %caller, selector = %selector, "Gated operation applied");
                } else {
                    debug!(caller = %caller, selector = %selector, "Gated operation awaiting approval");
                }
                self.publish(Some(caller), events, now);
                Ok(applied)
            }
            Err(err) => {
                warn!(caller = %caller, selector = %selector, error = %err, "Gated operation aborted");
                Err(err)
            }
        }
    }

    fn publish(&mut self, caller: Option<&AccountId>, events: Vec<AuthorityEvent>, now: DateTime<Utc>) {
        for event in events {
            let notice = AuthorityNotice::new(caller.cloned(), event, now);
            for sink in self.sinks.iter_mut() {
                sink.notify(&notice);
            }
            self.journal.record(notice);
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn owner_authority(&self) -> &AuthorityId {
        &self.state.owner
    }

    pub fn account(&self, account: &AccountId) -> AccountRecord {
        self.state.registry.lookup(account)
    }

    pub fn authority(&self, id: &AuthorityId) -> Option<&AuthorityRecord> {
        self.state.store.get(id)
    }

    pub fn authority_ids(&self) -> Vec<&AuthorityId> {
        self.state.store.ids()
    }

    pub fn active_members(&self, id: &AuthorityId) -> Vec<AccountId> {
        self.state.registry.active_members(id)
    }

    pub fn pending_approval(
        &self,
        authority: &AuthorityId,
        fingerprint: &Fingerprint,
    ) -> Option<&PendingApproval> {
        self.state.tracker.pending(authority, fingerprint)
    }

    /// Votes held for `operation` in `authority`'s track
    pub fn pending_count(&self, authority: &AuthorityId, operation: &GatedOperation) -> AuthorityResult<usize> {
        let fingerprint = operation.fingerprint()?;
        Ok(self.state.tracker.pending_count(authority, &fingerprint))
    }

    pub fn pending_for(&self, authority: &AuthorityId) -> Vec<(&Fingerprint, &PendingApproval)> {
        self.state.tracker.pending_for(authority)
    }

    pub fn journal(&self) -> &NoticeJournal {
        &self.journal
    }

    pub fn notices(&self) -> &[AuthorityNotice] {
        &self.journal.notices
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl std::fmt::Debug for AuthorityAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorityAdmin")
            .field("owner", &self.state.owner)
            .field("authorities", &self.state.store.len())
            .field("open_approvals", &self.state.tracker.open_count())
            .field("notices", &self.journal.len())
            .finish()
    }
}
