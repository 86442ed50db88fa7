// Application state module
// Read-only state shared by every connection task

use std::sync::Arc;

use super::types::Config;
use crate::handler::routes::{RouteTable, RouteTableError};
use crate::handler::static_files::AssetStore;
use crate::store::DocumentStore;

/// Application state
pub struct AppState {
    pub config: Config,
    /// API path table, validated on construction
    pub routes: RouteTable,
    /// Document storage; `None` when no database is configured
    pub store: Option<Arc<dyn DocumentStore>>,
    pub assets: Arc<dyn AssetStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Option<Arc<dyn DocumentStore>>,
        assets: Arc<dyn AssetStore>,
    ) -> Result<Self, RouteTableError> {
        Ok(Self {
            config,
            routes: RouteTable::standard()?,
            store,
            assets,
        })
    }

    /// Storage collaborator as a borrowed trait object
    pub fn store(&self) -> Option<&dyn DocumentStore> {
        self.store.as_deref()
    }
}
