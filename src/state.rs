use std::sync::Arc;
use crate::erp::OdooGateway;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn OdooGateway>,
    /// Login paired with API keys that arrive without one
    pub default_login: Option<String>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn OdooGateway>, default_login: Option<String>) -> Self {
        Self {
            gateway,
            default_login,
        }
    }
}
