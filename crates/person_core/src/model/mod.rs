//! Domain model for the person collection.
//!
//! # Responsibility
//! - Define the single document shape persisted by the store.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every stored document is identified by a store-assigned `PersonId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod person;
