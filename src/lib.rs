//! Canteen ordering backend.
//!
//! Role-based food ordering service: customers browse the menu, fill a
//! cart and check out; staff manage the catalog and order lifecycle;
//! admins manage accounts and the dashboard.

pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod queries;
pub mod routes;
pub mod server;

pub use config::Config;
pub use db::{create_pool, run_migrations};
pub use error::{AppError, AppResult};
