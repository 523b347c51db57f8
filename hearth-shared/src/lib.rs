//! # Hearth Shared Library
//!
//! Data-access layer and auth primitives shared by the Hearth API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Users, houses, memberships, tasks and restrictions
//! - `auth`: Bearer token validation, request auth context, membership checks

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Hearth shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
