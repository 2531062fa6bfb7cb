pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::analytics::AggregationEngine;
use crate::auth::AdminAuth;
use crate::state::LeadStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeadStore>,
    pub engine: Arc<AggregationEngine>,
    pub auth: Arc<AdminAuth>,
}

impl AppState {
    pub fn new(store: Arc<dyn LeadStore>, engine: AggregationEngine, auth: AdminAuth) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
            auth: Arc::new(auth),
        }
    }
}
