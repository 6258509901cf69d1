//! Scheduling domain model.
//!
//! # Responsibility
//! - Define the event record, its priority scale and the 12-hour clock codec.
//! - Provide the editable draft used by add/edit flows.
//!
//! # Invariants
//! - Stored events are immutable; edits replace the record at its slot.
//! - Every clock value inside the model has already passed `time::parse`.

pub mod draft;
pub mod event;
pub mod time;
