//! Shared application state for API handlers.

use std::sync::Arc;

use crate::auth::AuthState;
use crate::db::Database;
use crate::driver::{DriverRepository, DriverService};
use crate::mail::Mailer;
use crate::otp::OtpRepository;
use crate::parent::{ParentRepository, ParentService};
use crate::roster::{RosterRepository, RosterService};
use crate::school::{SchoolRepository, SchoolService};
use crate::ws::RelayHub;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub schools: SchoolService,
    pub drivers: DriverService,
    pub parents: ParentService,
    pub roster: RosterService,
    pub otp: OtpRepository,
    pub mailer: Option<Mailer>,
    pub auth: AuthState,
    pub hub: Arc<RelayHub>,
}

impl AppState {
    /// Wire up services over a database.
    pub fn new(db: &Database, auth: AuthState, mailer: Option<Mailer>) -> Self {
        let pool = db.pool().clone();
        Self {
            schools: SchoolService::new(SchoolRepository::new(pool.clone())),
            drivers: DriverService::new(DriverRepository::new(pool.clone())),
            parents: ParentService::new(ParentRepository::new(pool.clone())),
            roster: RosterService::new(
                RosterRepository::new(pool.clone()),
                DriverRepository::new(pool.clone()),
            ),
            otp: OtpRepository::new(pool),
            mailer,
            auth,
            hub: Arc::new(RelayHub::new()),
        }
    }
}
