//! Waterline Core - Shared types library.
//!
//! This crate provides common types used across all Waterline components:
//! - `server` - JSON API for the district's field-asset tooling
//! - `cli` - Command-line tools for migrations and user bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, roles and map statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
