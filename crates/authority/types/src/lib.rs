//! Threshold Authority Domain Types
//!
//! This crate defines the domain types for a multi-authority, threshold-based
//! access-control core: authorities (named groups of accounts) gate sensitive
//! operations behind N-of-M approval, each with its own permission set and
//! validity window.
//!
//! # Key Concepts
//!
//! - **Authority**: a named group of accounts sharing permitted operations,
//!   an approval threshold, and an expiry.
//! - **Owner authority**: created once at initialization, never expires, and
//!   may act for any other authority.
//! - **Gated operation**: a call carried with its full argument payload.
//!   Its [`Fingerprint`] keys an independent approval track.
//! - **Restricted account**: a removed member. It keeps its authority id but
//!   never passes an admission check again.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime behavior. All types implement
//! `Clone`, `Debug`, `Serialize`, `Deserialize`. IDs use the newtype pattern
//! and implement `Display` and `new()`.

#![deny(unsafe_code)]

mod account;
mod authority;
mod config;
mod errors;
mod events;
mod ids;
mod operation;

pub use account::*;
pub use authority::*;
pub use config::*;
pub use errors::*;
pub use events::*;
pub use ids::*;
pub use operation::*;
