//! # Grove Core
//!
//! The domain layer of the Grove backend: entities, ports and the services
//! that orchestrate them. Infrastructure lives in `grove-infra`.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
