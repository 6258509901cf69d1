//! Storage adapters for the persistence port.
//!
//! # Responsibility
//! - Keep SQL details inside the core persistence boundary.
//! - Translate rows into validated domain events.
//!
//! # Invariants
//! - Adapters return semantic `InvalidData` errors in addition to DB
//!   transport errors.

pub mod event_repo;
