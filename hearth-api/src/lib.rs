//! # Hearth API Server Library
//!
//! HTTP layer over the Hearth data-access library: houses, memberships,
//! tasks and restrictions behind bearer-token authentication.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response hardening
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
