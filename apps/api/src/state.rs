//! Shared application state handed to every handler.

use chrono::NaiveDate;
use pharmos_core::StatusPolicy;
use pharmos_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub status_policy: StatusPolicy,
}

impl AppState {
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        AppState {
            db,
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs),
            status_policy: config.status_policy(),
        }
    }

    /// The calendar date status classification runs against.
    ///
    /// Expiry dates have no time zone; the server's local date is used.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
