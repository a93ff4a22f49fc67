// src/state.rs

use sqlx::SqlitePool;

use crate::attachments::AttachmentStore;
use crate::auth::AuthService;
use crate::customers::CustomerStore;
use crate::interventions::InterventionStore;
use crate::licenses::LicenseStore;

/// Shared application state. Stores hold cheap pool clones; the whole struct
/// is wrapped in an `Arc` by the router.
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: AuthService,
    pub interventions: InterventionStore,
    pub customers: CustomerStore,
    pub licenses: LicenseStore,
    pub attachments: AttachmentStore,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            auth: AuthService::new(pool.clone()),
            interventions: InterventionStore::new(pool.clone()),
            customers: CustomerStore::new(pool.clone()),
            licenses: LicenseStore::new(pool.clone()),
            attachments: AttachmentStore::new(pool.clone()),
            pool,
        }
    }
}
