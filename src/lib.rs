//! EdLoop Server Library
//!
//! Vote ledger, feed ranking and the HTTP surface around them.

pub mod clock;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod extractors;
pub mod ledger;
pub mod models;
pub mod ranking;
pub mod routes;
pub mod security;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use db::{Db, open_database};
pub use error::{AppError, Result};
pub use ledger::VoteLedger;
pub use ranking::{SortStrategy, rank};

use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new AppState reading wall-clock time
    pub fn new(db: Db, config: Config) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    /// Create a new AppState with an explicit time source
    pub fn with_clock(db: Db, config: Config, clock: Arc<dyn Clock>) -> Self {
        Self { db, config, clock }
    }

    pub fn ledger(&self) -> VoteLedger {
        VoteLedger::new(self.db.clone())
    }
}
