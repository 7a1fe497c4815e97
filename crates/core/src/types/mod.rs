//! Core types for Waterline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod role;
pub mod shape;
pub mod username;

pub use catalog::CatalogKind;
pub use id::*;
pub use role::{ParseRoleError, UserRole};
pub use shape::{ShapeKind, ShapeStatus};
pub use username::{Username, UsernameError};
