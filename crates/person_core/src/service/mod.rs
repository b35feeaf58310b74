//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Offer callback-style completion on top of `Result` returns.

pub mod completion;
pub mod person_service;
