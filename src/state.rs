use std::sync::Arc;

use crate::application::services::{DirectoryService, EdgeProxyService};

#[derive(Clone)]
pub struct AppState {
    pub directory: DirectoryService,
    pub edge: Arc<EdgeProxyService>,
    /// Trigger used when a bang matches no entry. Fixed at startup.
    pub default_trigger: String,
    /// Public base URL shown on the default page.
    pub public_url: String,
}

impl AppState {
    pub fn new(
        directory: DirectoryService,
        edge: Arc<EdgeProxyService>,
        default_trigger: String,
        public_url: String,
    ) -> Self {
        Self {
            directory,
            edge,
            default_trigger,
            public_url,
        }
    }
}
