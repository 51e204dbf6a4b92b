// Module declarations for HTTP handlers
pub mod health;
pub mod tasks;
pub mod timesheets;

// Re-exports
pub use health::{health_handler, ready_handler};
pub use tasks::tasks_handler;
pub use timesheets::timesheets_handler;
