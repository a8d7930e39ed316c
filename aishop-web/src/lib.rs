//! # AI Shopping Web Server Library
//!
//! Server-rendered account pages for AI Shopping: signup, login, logout,
//! the dashboard and the user's profile.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error type and error page rendering
//! - `flash`: One-shot messages stored in the session
//! - `forms`: Form parsing and validation
//! - `middleware`: Auth extractors and security headers
//! - `routes`: Route handlers
//! - `templates`: Askama page templates

pub mod app;
pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod templates;
