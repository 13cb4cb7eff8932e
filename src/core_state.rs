//! Shared application state for HTTP handlers.
//!
//! One `CoreState` is built at startup and shared via `Arc`. It holds
//! the database path (handlers open their own connection per request,
//! nothing is cached between requests) and the schedule advisor
//! collaborator.

use std::path::PathBuf;
use std::sync::Arc;

use crate::advisor::ScheduleAdvisor;
use crate::db::{self, DatabaseError};

pub struct CoreState {
    db_path: PathBuf,
    advisor: Arc<dyn ScheduleAdvisor>,
}

impl CoreState {
    pub fn new(db_path: PathBuf, advisor: Arc<dyn ScheduleAdvisor>) -> Self {
        Self { db_path, advisor }
    }

    /// Open a database connection. Pragmas and migrations are applied
    /// on every open; both are idempotent.
    pub fn open_db(&self) -> Result<rusqlite::Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    pub fn advisor(&self) -> &dyn ScheduleAdvisor {
        self.advisor.as_ref()
    }
}
