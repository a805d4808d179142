//! Account records: which authority an account belongs to
//!
//! Removal never erases the association. A removed account keeps its
//! authority id and is flagged restricted for good.

use crate::AuthorityId;
use serde::{Deserialize, Serialize};

/// Registry entry for a single account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Owning authority, `None` while unassigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority_id: Option<AuthorityId>,
    /// Permanently barred from every admission check
    pub restricted: bool,
}

impl AccountRecord {
    /// A fresh, unassigned account
    pub fn unassigned() -> Self {
        Self::default()
    }

    pub fn assigned(authority_id: AuthorityId) -> Self {
        Self {
            authority_id: Some(authority_id),
            restricted: false,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.authority_id.is_some()
    }

    /// Assigned and not restricted
    pub fn is_active(&self) -> bool {
        self.is_assigned() && !self.restricted
    }

    /// Active member of the given authority
    pub fn is_active_in(&self, authority_id: &AuthorityId) -> bool {
        !self.restricted && self.authority_id.as_ref() == Some(authority_id)
    }
}
