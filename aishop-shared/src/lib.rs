//! # AI Shopping Shared Library
//!
//! Types and persistence shared by the AI Shopping web server.
//!
//! ## Module Organization
//!
//! - `models`: User record and its SQL queries
//! - `store`: Identity store trait with PostgreSQL and in-memory backends
//! - `db`: Connection pool and embedded migrations
//! - `auth`: Password hashing and session login state

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
