//! Process-wide store handle.
//!
//! The handle is created once at startup and passed to every repository.
//! A failed connect does not abort the process: the handle keeps the failure
//! and reports it as `DbError::Unavailable` on every later use.

use super::{open_store, DbError, DbResult};
use crate::config::StoreConfig;
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug)]
pub struct StoreHandle {
    state: Result<Connection, String>,
}

impl StoreHandle {
    /// Connects using `config`, degrading instead of failing.
    pub fn connect(config: &StoreConfig) -> Self {
        match open_store(config) {
            Ok(conn) => {
                info!(
                    "event=store_connect module=db status=ok mode={}",
                    config.mode()
                );
                Self::connected(conn)
            }
            Err(err) => Self::degraded(err.to_string()),
        }
    }

    pub fn connected(conn: Connection) -> Self {
        Self { state: Ok(conn) }
    }

    /// Builds a handle that never connected, e.g. after a config error.
    pub fn degraded(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        error!(
            "event=store_connect module=db status=error mode=degraded error={}",
            reason
        );
        Self { state: Err(reason) }
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_ok()
    }

    /// Borrows the live connection, or reports why there is none.
    pub fn connection(&self) -> DbResult<&Connection> {
        self.state
            .as_ref()
            .map_err(|reason| DbError::Unavailable(reason.clone()))
    }
}
