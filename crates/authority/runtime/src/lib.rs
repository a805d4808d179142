//! Threshold Authority Runtime
//!
//! This crate provides the authorization engine for multi-authority,
//! threshold-gated access control: authority and account bookkeeping,
//! admission checks, and the N-of-M approval state machine that guards
//! every sensitive operation, including the reconfiguration of the
//! authorities themselves.
//!
//! # Architecture
//!
//! The [`AuthorityAdmin`] is the main entry point. It owns the state and
//! composes specialized components:
//!
//! - [`AccountRegistry`] - account to authority mapping, restriction
//! - [`AuthorityStore`] - authority records and their invariants
//! - [`ApprovalTracker`] - pending approvals per `(authority, fingerprint)`
//! - [`AccessGate`] - OwnerOnly / AuthorityOnly / SelfAuthorityOnly checks
//! - [`Clock`] - injected time source for expiry
//! - [`NotificationSink`] - consumers of committed notices
//!
//! # Key Invariants
//!
//! 1. `member_count >= threshold >= 1` for every authority with members
//! 2. An account belongs to at most one authority, forever
//! 3. A restricted account never passes an admission check
//! 4. A pending approval set never holds the same account twice
//! 5. Every call is atomic: an error leaves no vote, mutation, or notice
//!
//! # Example
//!
//! ```rust
//! use authority_runtime::AuthorityAdmin;
//! use authority_types::{AccountId, AuthorityConfig, AuthorityId};
//!
//! let config = AuthorityConfig::new(
//!     vec![AccountId::new("a"), AccountId::new("b"), AccountId::new("c")],
//!     2,
//! );
//! let mut admin = AuthorityAdmin::with_system_clock(&config).unwrap();
//! let owner = AuthorityId::owner();
//!
//! // First vote is recorded, second one applies the change
//! assert!(!admin.set_threshold(&AccountId::new("a"), owner.clone(), 3).unwrap());
//! assert!(admin.set_threshold(&AccountId::new("b"), owner.clone(), 3).unwrap());
//! assert_eq!(admin.authority(&owner).unwrap().threshold, 3);
//! ```

#![deny(unsafe_code)]

pub mod access_gate;
pub mod account_registry;
pub mod approval_tracker;
pub mod authority_admin;
pub mod authority_store;
pub mod clock;
pub mod notification;

// Re-export main types for convenience
pub use access_gate::{AccessGate, Admission, AdmissionCheck};
pub use account_registry::AccountRegistry;
pub use approval_tracker::{ApprovalTracker, PendingApproval, VoteResult};
pub use authority_admin::{AuthorityAdmin, AuthorityState};
pub use authority_store::AuthorityStore;
pub use clock::{Clock, ManualClock, SystemClock};
pub use notification::{CollectingSink, NotificationSink, TracingSink};
