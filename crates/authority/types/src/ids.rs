//! Identifiers: accounts, authorities, and operation selectors
//!
//! All identifiers use the newtype pattern over `String` so they can be
//! hashed, ordered, serialized, and printed without leaking the raw type.

use serde::{Deserialize, Serialize};

/// An account that may belong to at most one authority.
///
/// Authentication happens upstream; by the time an `AccountId` reaches the
/// engine it is the verified caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an authority (a named group of accounts)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorityId(pub String);

impl AuthorityId {
    /// Default identifier of the owner authority
    pub const OWNER: &'static str = "owner";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The conventional owner authority id
    pub fn owner() -> Self {
        Self(Self::OWNER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names a gated operation kind (e.g. `set_threshold`, `treasury.transfer`).
///
/// Authorities are granted sets of selectors; the owner authority bypasses
/// the selector check entirely.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationSelector(pub String);

impl OperationSelector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OperationSelector {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}
