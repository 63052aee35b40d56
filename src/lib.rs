pub mod app;
pub mod approval;
pub mod authz;
pub mod db;
pub mod docs;
pub mod errors;
pub mod identity;
pub mod jwt;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
pub mod webhook;

// Re-export commonly used items for tests
pub use app::{create_app, router, AppState};
