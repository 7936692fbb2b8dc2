//! # TaskTally API Server Library
//!
//! HTTP boundary for TaskTally: JSON endpoints over the core operations in
//! `tasktally-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and token middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors with JSON error bodies
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
