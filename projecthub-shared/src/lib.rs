//! # ProjectHub Shared Library
//!
//! This crate contains the domain types, persistence models and business
//! rules used by the ProjectHub API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens, bearer context and authorization rules
//! - `db`: Connection pool and migrations
//! - `models`: Database models and data structures
//! - `notifications`: Notification fanout (planning and delivery)

pub mod auth;
pub mod db;
pub mod models;
pub mod notifications;

/// Current version of the ProjectHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
