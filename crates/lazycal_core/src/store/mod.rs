//! Event storage keyed by calendar day.
//!
//! # Responsibility
//! - Own the date -> bucket mapping and its mutation API.
//! - Define the error kinds returned by scheduling operations.
//!
//! # Invariants
//! - Empty buckets are never stored.
//! - Derivations read `EventSnapshot`s and never mutate the store.

pub mod error;
pub mod event_store;
