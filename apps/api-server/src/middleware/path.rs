//! Typed path parameters.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

use super::error::AppError;

/// Parse a path segment that must be a positive integer id.
pub fn positive_id(raw: &str, param: &str) -> Result<i64, AppError> {
    let message = format!("{param} must be a positive number");
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(AppError::BadRequest(vec![message])),
        Err(e) => Err(AppError::BadRequest(vec![message, e.to_string()])),
    }
}

/// The `{fruit_id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FruitId(pub i64);

impl FromRequest for FruitId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("fruit_id").unwrap_or_default();
        ready(positive_id(raw, "fruit-id").map(FruitId))
    }
}
