//! Authority records: permissions, threshold, membership size, expiry

use crate::{AuthorityId, OperationSelector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Point in time after which a non-owner authority stops passing
/// selector-scoped admission checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValidUntil {
    /// Never expires
    #[default]
    Forever,
    /// Valid up to and including this instant
    At(DateTime<Utc>),
}

impl ValidUntil {
    /// Valid while `now <= valid_until`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            ValidUntil::Forever => true,
            ValidUntil::At(deadline) => now <= *deadline,
        }
    }
}

impl std::fmt::Display for ValidUntil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidUntil::Forever => write!(f, "forever"),
            ValidUntil::At(deadline) => write!(f, "{}", deadline.to_rfc3339()),
        }
    }
}

/// A named group of accounts sharing permissions and an approval threshold.
///
/// Pending approvals are tracked separately, keyed by
/// `(authority, fingerprint)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityRecord {
    pub id: AuthorityId,
    /// Selectors this authority may invoke (ignored for the owner)
    pub permitted_operations: BTreeSet<OperationSelector>,
    /// Distinct approvals required per operation
    pub threshold: u32,
    /// Members counted for the threshold, restricted ones included until removed
    pub member_count: u32,
    pub valid_until: ValidUntil,
    pub created_at: DateTime<Utc>,
}

impl AuthorityRecord {
    pub fn new(id: AuthorityId, member_count: u32, threshold: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            permitted_operations: BTreeSet::new(),
            threshold,
            member_count,
            valid_until: ValidUntil::Forever,
            created_at,
        }
    }

    pub fn with_operations(mut self, ops: impl IntoIterator<Item = OperationSelector>) -> Self {
        self.permitted_operations.extend(ops);
        self
    }

    pub fn with_valid_until(mut self, valid_until: ValidUntil) -> Self {
        self.valid_until = valid_until;
        self
    }

    /// Has at least one member; zero-member authorities accept no operations
    pub fn is_live(&self) -> bool {
        self.member_count > 0
    }

    pub fn permits(&self, selector: &OperationSelector) -> bool {
        self.permitted_operations.contains(selector)
    }

    /// `member_count >= threshold >= 1` whenever the authority has members
    pub fn threshold_holds(&self) -> bool {
        self.member_count == 0 || (self.threshold >= 1 && self.threshold <= self.member_count)
    }
}
