pub mod api;
pub mod auth;
pub mod config;
pub mod envelope;
pub mod erp;
pub mod error;
pub mod handlers;
pub mod html;
pub mod models;
pub mod odoo;
pub mod provision;
pub mod server;
pub mod state;

pub use config::Config;
pub use envelope::{ApiError, ApiResult};
pub use error::Error;
pub use odoo::{Odoo, Session};
pub use state::AppState;
