//! Error types for the authority layer

use crate::{AccountId, AuthorityId, OperationSelector};

/// Errors that can occur in authority operations.
///
/// Any error aborts the operation that raised it with no observable effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    #[error("Permission denied for {caller}: {reason}")]
    PermissionDenied { caller: AccountId, reason: String },

    #[error("Unknown authority: {0}")]
    UnknownAuthority(AuthorityId),

    #[error("Account {account} already assigned to authority {authority}")]
    AlreadyAssigned {
        account: AccountId,
        authority: AuthorityId,
    },

    #[error("Invalid threshold {threshold} for {member_count} members")]
    InvalidThreshold { threshold: u32, member_count: u32 },

    #[error("Duplicate approval by {voter} for {selector}")]
    DuplicateApproval {
        voter: AccountId,
        selector: OperationSelector,
    },

    #[error("Authority expired: {0}")]
    ExpiredAuthority(AuthorityId),

    #[error("Invariant violation on {authority}: {reason}")]
    InvariantViolation {
        authority: AuthorityId,
        reason: String,
    },

    #[error("Account {account} is not a member of {authority}")]
    NotMember {
        account: AccountId,
        authority: AuthorityId,
    },

    #[error("Account restricted: {0}")]
    AccountRestricted(AccountId),

    #[error("Authority already exists: {0}")]
    AuthorityExists(AuthorityId),

    #[error("Empty membership for authority {0}")]
    EmptyMembership(AuthorityId),

    #[error("Authority engine not initialized")]
    NotInitialized,

    #[error("Authority engine already initialized")]
    AlreadyInitialized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl AuthorityError {
    pub fn denied(caller: &AccountId, reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            caller: caller.clone(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for authority operations
pub type AuthorityResult<T> = Result<T, AuthorityError>;
