// Odoo access used by the HTTP handlers
pub mod client;
pub mod mock;
pub mod traits;

pub use client::OdooClient;
pub use mock::MockGateway;
pub use traits::OdooGateway;
