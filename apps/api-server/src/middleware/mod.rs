//! Middleware modules: errors, extractors and request guards.

pub mod auth;
pub mod error;
pub mod path;
