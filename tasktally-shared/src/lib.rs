//! # TaskTally Shared Library
//!
//! Domain types, storage and business rules used by the TaskTally API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, tokens, request identity and access rules
//! - `db`: Connection pool and embedded migrations
//! - `services`: Core operations (instantiation, completion, points, directory)
//! - `error`: Core error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

/// Current version of the TaskTally shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
