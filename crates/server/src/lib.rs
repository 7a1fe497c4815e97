//! Waterline server library.
//!
//! JSON API for the district's field-asset tooling: catalog, inventory and
//! sales, map shapes with pipe logs, map notes, two-party messaging and an
//! audit trail.
//!
//! # Layers
//!
//! - [`routes`] - axum handlers; extract, call a service, render
//! - [`services`] - validation, role checks, audit entries
//! - [`store`] - storage traits, with [`db::PgStore`] for `PostgreSQL` and
//!   [`store::memory::InMemoryStore`] for tests
//!
//! The binary in `main.rs` wires these together with configuration,
//! tracing, Sentry and sessions.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
