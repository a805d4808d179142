//! Gated operations and their fingerprints
//!
//! Every gated call is described by a [`GatedOperation`] carrying its full
//! argument payload. The [`Fingerprint`] of that payload keys the approval
//! track, so two calls that differ in any argument are approved
//! independently. The caller is not part of the fingerprint.

use crate::{AccountId, AuthorityError, AuthorityId, AuthorityResult, OperationSelector, ValidUntil};
use serde::{Deserialize, Serialize};
use std::fmt;

const FINGERPRINT_DOMAIN: &[u8] = b"authority-op-v1:";

/// Deterministic BLAKE3 digest of an operation payload (32 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// A gated call together with every argument it was invoked with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GatedOperation {
    CreateAuthority {
        id: AuthorityId,
        members: Vec<AccountId>,
        operations: Vec<OperationSelector>,
        valid_until: ValidUntil,
        threshold: u32,
    },
    SetValidUntil {
        id: AuthorityId,
        valid_until: ValidUntil,
    },
    GrantOperations {
        id: AuthorityId,
        operations: Vec<OperationSelector>,
    },
    RevokeOperations {
        id: AuthorityId,
        operations: Vec<OperationSelector>,
    },
    SetThreshold {
        id: AuthorityId,
        threshold: u32,
    },
    AddMembers {
        id: AuthorityId,
        accounts: Vec<AccountId>,
    },
    RemoveMembers {
        id: AuthorityId,
        accounts: Vec<AccountId>,
    },
    /// A business operation approved here and dispatched elsewhere
    Invoke {
        selector: OperationSelector,
        payload: Vec<u8>,
    },
}

impl GatedOperation {
    pub const CREATE_AUTHORITY: &'static str = "create_authority";
    pub const SET_VALID_UNTIL: &'static str = "set_valid_until";
    pub const GRANT_OPERATIONS: &'static str = "grant_operations";
    pub const REVOKE_OPERATIONS: &'static str = "revoke_operations";
    pub const SET_THRESHOLD: &'static str = "set_threshold";
    pub const ADD_MEMBERS: &'static str = "add_members";
    pub const REMOVE_MEMBERS: &'static str = "remove_members";

    /// Selector naming this operation kind
    pub fn selector(&self) -> OperationSelector {
        match self {
            GatedOperation::CreateAuthority { .. } => Self::CREATE_AUTHORITY.into(),
            GatedOperation::SetValidUntil { .. } => Self::SET_VALID_UNTIL.into(),
            GatedOperation::GrantOperations { .. } => Self::GRANT_OPERATIONS.into(),
            GatedOperation::RevokeOperations { .. } => Self::REVOKE_OPERATIONS.into(),
            GatedOperation::SetThreshold { .. } => Self::SET_THRESHOLD.into(),
            GatedOperation::AddMembers { .. } => Self::ADD_MEMBERS.into(),
            GatedOperation::RemoveMembers { .. } => Self::REMOVE_MEMBERS.into(),
            GatedOperation::Invoke { selector, .. } => selector.clone(),
        }
    }

    /// Authority the operation acts upon, if any
    pub fn target(&self) -> Option<&AuthorityId> {
        match self {
            GatedOperation::CreateAuthority { id, .. }
            | GatedOperation::SetValidUntil { id, .. }
            | GatedOperation::GrantOperations { id, .. }
            | GatedOperation::RevokeOperations { id, .. }
            | GatedOperation::SetThreshold { id, .. }
            | GatedOperation::AddMembers { id, .. }
            | GatedOperation::RemoveMembers { id, .. } => Some(id),
            GatedOperation::Invoke { .. } => None,
        }
    }

    /// Hash of the operation kind and its full argument payload
    pub fn fingerprint(&self) -> AuthorityResult<Fingerprint> {
        let encoded =
            serde_json::to_vec(self).map_err(|e| AuthorityError::Encoding(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(FINGERPRINT_DOMAIN);
        hasher.update(&encoded);
        Ok(Fingerprint::from_bytes(*hasher.finalize().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_threshold(id: &str, threshold: u32) -> GatedOperation {
        GatedOperation::SetThreshold {
            id: AuthorityId::new(id),
            threshold,
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = set_threshold("owner", 3).fingerprint().unwrap();
        let b = set_threshold("owner", 3).fingerprint().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_covers_every_argument() {
        let base = set_threshold("owner", 3).fingerprint().unwrap();
        assert_ne!(base, set_threshold("owner", 2).fingerprint().unwrap());
        assert_ne!(base, set_threshold("ops", 3).fingerprint().unwrap());

        // Same arguments, different kind
        let add = GatedOperation::AddMembers {
            id: AuthorityId::new("owner"),
            accounts: vec![AccountId::new("a")],
        };
        let remove = GatedOperation::RemoveMembers {
            id: AuthorityId::new("owner"),
            accounts: vec![AccountId::new("a")],
        };
        assert_ne!(add.fingerprint().unwrap(), remove.fingerprint().unwrap());
    }

    #[test]
    fn test_invoke_fingerprint_covers_payload() {
        let a = GatedOperation::Invoke {
            selector: "treasury.transfer".into(),
            payload: b"100".to_vec(),
        };
        let b = GatedOperation::Invoke {
            selector: "treasury.transfer".into(),
            payload: b"101".to_vec(),
        };
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.selector().as_str(), "treasury.transfer");
        assert!(a.target().is_none());
    }

    #[test]
    fn test_selectors() {
        assert_eq!(set_threshold("x", 1).selector().as_str(), GatedOperation::SET_THRESHOLD);
        assert_eq!(set_threshold("x", 1).target(), Some(&AuthorityId::new("x")));
    }

    #[test]
    fn test_fingerprint_display_is_short_hex() {
        let fp = set_threshold("owner", 1).fingerprint().unwrap();
        assert_eq!(format!("{}", fp).len(), 16);
        assert_eq!(fp.to_hex().len(), 64);
    }
}
