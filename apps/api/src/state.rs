use std::sync::Arc;

use crate::screening::service::ScreeningService;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record store behind the `/api/user` surface, shared with the service.
    pub store: Arc<dyn RecordStore>,
    pub screening: Arc<ScreeningService>,
}
