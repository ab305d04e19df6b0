//! # Taskboard API Server Library
//!
//! Core functionality for the Taskboard API server.
//!
//! ## Modules
//!
//! - `app`: Application state, store selection and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
