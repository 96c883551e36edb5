//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to create or replace a fruit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FruitRequest {
    pub name: Option<String>,
    pub price: Option<i32>,
}

/// A fruit as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FruitResponse {
    pub id: i64,
    pub name: String,
    pub price: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a user. The account stays unverified until its owner signs in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub email: String,
    pub display_name: Option<String>,
    pub about: Option<String>,
    pub avatar_url: Option<String>,
}

/// Full view of the caller's own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub about: Option<String>,
    pub avatar_url: Option<String>,
    pub last_login_at: DateTime<Utc>,
}

/// What anyone may see about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublicResponse {
    pub id: i64,
    pub display_name: Option<String>,
    pub about: Option<String>,
    pub avatar_url: Option<String>,
}
