//! Recipes: a small web application for managing recipes stored in MySQL.
//!
//! Pages are rendered with Tera, every request opens and closes its own database
//! connection, and `/liveness` and `/readiness` serve container orchestration.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod templates;

pub use error::*;
