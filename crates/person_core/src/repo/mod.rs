//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document-style data access contract for people.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - "No match" is `None`/empty, never an error; `NotFound` is reserved for
//!   writes that target a vanished document.

pub mod person_repo;
