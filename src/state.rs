use std::sync::Arc;

use crate::billing::BillingEngine;
use crate::security::jwt::JwtManager;
use crate::store::{CredentialStore, PropertyCatalog};

/// Shared handles, constructor-injected so every consumer (and every test)
/// can substitute its own store implementations.
pub struct AppState {
    pub catalog: Arc<dyn PropertyCatalog>,
    pub users: Arc<dyn CredentialStore>,
    pub jwt: JwtManager,
    pub billing: BillingEngine,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn PropertyCatalog>,
        users: Arc<dyn CredentialStore>,
        jwt: JwtManager,
        billing: BillingEngine,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            users,
            jwt,
            billing,
        })
    }
}
