//! # Grove Shared
//!
//! Wire types shared by the server and its clients: the error envelope and
//! request/response DTOs.

pub mod dto;
pub mod response;

pub use response::{ErrorEntry, ErrorResponse, ErrorType, Message};
