//! Read-only derivations over event snapshots.
//!
//! # Responsibility
//! - Order one day's events for display (`sort`).
//! - Build month-view indicators (`marks`).
//! - Build the chronological cross-date listing (`summary`).
//!
//! # Invariants
//! - Nothing here mutates the store; every function returns new data.

pub mod marks;
pub mod sort;
pub mod summary;
