//! Core persistence layer for the person collection.
//! This crate owns the record shape, its validation and every store access.

pub mod config;
pub mod db;
pub mod fixtures;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LogConfig, StoreConfig, StoreTarget};
pub use db::{DbError, StoreHandle};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::person::{
    NewPerson, Person, PersonDocument, PersonField, PersonId, PersonValidationError, Projection,
};
pub use repo::person_repo::{
    DeleteSummary, PersonFilter, PersonQuery, PersonRepository, PersonUpdate, RepoError,
    RepoResult, SortKey, SortOrder, SqlitePersonRepository,
};
pub use service::completion::complete;
pub use service::person_service::PersonService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
