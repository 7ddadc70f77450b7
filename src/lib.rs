pub mod error;
pub mod integrity;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod repo;
pub mod reports;
pub mod routes;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
