//! Genesis configuration for the owner authority

use crate::{AccountId, AuthorityError, AuthorityId, AuthorityResult, OperationSelector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration used to initialize the engine.
///
/// The owner authority is the only authority not created through a gated
/// operation. Its members and threshold come from here.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Identifier of the owner authority
    pub owner_authority: AuthorityId,
    /// Initial owner members
    pub owner_members: Vec<AccountId>,
    /// Approvals required for owner-gated operations
    pub owner_threshold: u32,
    /// Selectors recorded on the owner (informational, the owner bypasses the check)
    pub owner_operations: Vec<OperationSelector>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            owner_authority: AuthorityId::owner(),
            owner_members: Vec::new(),
            owner_threshold: 1,
            owner_operations: Vec::new(),
        }
    }
}

impl AuthorityConfig {
    pub fn new(owner_members: Vec<AccountId>, owner_threshold: u32) -> Self {
        Self {
            owner_members,
            owner_threshold,
            ..Self::default()
        }
    }

    pub fn with_owner_authority(mut self, id: AuthorityId) -> Self {
        self.owner_authority = id;
        self
    }

    pub fn with_owner_operations(mut self, ops: Vec<OperationSelector>) -> Self {
        self.owner_operations = ops;
        self
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> AuthorityResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AuthorityError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the preconditions for creating the owner authority
    pub fn validate(&self) -> AuthorityResult<()> {
        if self.owner_authority.as_str().is_empty() {
            return Err(AuthorityError::Config("owner authority id is empty".into()));
        }
        if self.owner_members.is_empty() {
            return Err(AuthorityError::EmptyMembership(self.owner_authority.clone()));
        }

        let mut seen = HashSet::new();
        for member in &self.owner_members {
            if !seen.insert(member) {
                return Err(AuthorityError::Config(format!(
                    "owner member listed twice: {}",
                    member
                )));
            }
        }

        let member_count = self.owner_members.len() as u32;
        if self.owner_threshold == 0 || self.owner_threshold > member_count {
            return Err(AuthorityError::InvalidThreshold {
                threshold: self.owner_threshold,
                member_count,
            });
        }
        Ok(())
    }
}
