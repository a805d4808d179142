//! Notifications emitted on committed state transitions
//!
//! Every committed operation produces one or more [`AuthorityEvent`]s. The
//! runtime wraps each in an [`AuthorityNotice`] and appends it to the
//! [`NoticeJournal`], the engine's accountability record.

use crate::{AccountId, AuthorityId, Fingerprint, OperationSelector, ValidUntil};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured state-change event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthorityEvent {
    AuthorityCreated {
        authority: AuthorityId,
        members: Vec<AccountId>,
        operations: Vec<OperationSelector>,
        threshold: u32,
        valid_until: ValidUntil,
    },
    ApprovalRecorded {
        authority: AuthorityId,
        selector: OperationSelector,
        fingerprint: Fingerprint,
        voter: AccountId,
        votes: u32,
        threshold: u32,
    },
    ApprovalReached {
        authority: AuthorityId,
        selector: OperationSelector,
        fingerprint: Fingerprint,
        voter: AccountId,
    },
    ValidUntilChanged {
        authority: AuthorityId,
        valid_until: ValidUntil,
    },
    ThresholdChanged {
        authority: AuthorityId,
        threshold: u32,
    },
    OperationsGranted {
        authority: AuthorityId,
        operations: Vec<OperationSelector>,
    },
    OperationsRevoked {
        authority: AuthorityId,
        operations: Vec<OperationSelector>,
    },
    MembersAdded {
        authority: AuthorityId,
        accounts: Vec<AccountId>,
    },
    MembersRemoved {
        authority: AuthorityId,
        accounts: Vec<AccountId>,
    },
}

impl AuthorityEvent {
    /// The authority the event is about
    pub fn authority(&self) -> &AuthorityId {
        match self {
            AuthorityEvent::AuthorityCreated { authority, .. }
            | AuthorityEvent::ApprovalRecorded { authority, .. }
            | AuthorityEvent::ApprovalReached { authority, .. }
            | AuthorityEvent::ValidUntilChanged { authority, .. }
            | AuthorityEvent::ThresholdChanged { authority, .. }
            | AuthorityEvent::OperationsGranted { authority, .. }
            | AuthorityEvent::OperationsRevoked { authority, .. }
            | AuthorityEvent::MembersAdded { authority, .. }
            | AuthorityEvent::MembersRemoved { authority, .. } => authority,
        }
    }

    /// Short machine name, handy for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            AuthorityEvent::AuthorityCreated { .. } => "authority_created",
            AuthorityEvent::ApprovalRecorded { .. } => "approval_recorded",
            AuthorityEvent::ApprovalReached { .. } => "approval_reached",
            AuthorityEvent::ValidUntilChanged { .. } => "valid_until_changed",
            AuthorityEvent::ThresholdChanged { .. } => "threshold_changed",
            AuthorityEvent::OperationsGranted { .. } => "operations_granted",
            AuthorityEvent::OperationsRevoked { .. } => "operations_revoked",
            AuthorityEvent::MembersAdded { .. } => "members_added",
            AuthorityEvent::MembersRemoved { .. } => "members_removed",
        }
    }
}

/// A committed event with its provenance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorityNotice {
    /// Unique notice identifier
    pub notice_id: String,
    /// Account whose call produced the event (`None` during initialization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<AccountId>,
    pub event: AuthorityEvent,
    /// Time from the injected clock at commit
    pub recorded_at: DateTime<Utc>,
}

impl AuthorityNotice {
    pub fn new(caller: Option<AccountId>, event: AuthorityEvent, recorded_at: DateTime<Utc>) -> Self {
        Self {
            notice_id: uuid::Uuid::new_v4().to_string(),
            caller,
            event,
            recorded_at,
        }
    }
}

/// Append-only record of every committed notice
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NoticeJournal {
    pub notices: Vec<AuthorityNotice>,
}

impl NoticeJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, notice: AuthorityNotice) {
        self.notices.push(notice);
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn last(&self) -> Option<&AuthorityNotice> {
        self.notices.last()
    }

    /// All notices about a given authority
    pub fn for_authority(&self, authority: &AuthorityId) -> Vec<&AuthorityNotice> {
        self.notices
            .iter()
            .filter(|n| n.event.authority() == authority)
            .collect()
    }

    /// All notices of a given kind (see [`AuthorityEvent::kind`])
    pub fn of_kind(&self, kind: &str) -> Vec<&AuthorityNotice> {
        self.notices.iter().filter(|n| n.event.kind() == kind).collect()
    }
}
