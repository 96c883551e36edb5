use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Editable profile fields. `None` means "not set" on reads and "leave unchanged" on updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub about: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Overlay the fields present in `patch` onto `self`.
    pub fn merge(&mut self, patch: UserProfile) {
        if patch.display_name.is_some() {
            self.display_name = patch.display_name;
        }
        if patch.about.is_some() {
            self.about = patch.about;
        }
        if patch.avatar_url.is_some() {
            self.avatar_url = patch.avatar_url;
        }
    }
}

/// User entity, keyed by the email the identity provider vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub email_verified: bool,
    pub last_login_at: DateTime<Utc>,
    pub profile: UserProfile,
    pub is_deleted: bool,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The part of a user that other users may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublicData {
    pub id: i64,
    pub profile: UserProfile,
}

impl From<&User> for UserPublicData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            profile: user.profile.clone(),
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub profile: UserProfile,
}

impl NewUser {
    pub fn new(email: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            email: email.into(),
            profile,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(DomainError::Validation(vec![
                "email must be a valid address".to_string(),
            ]));
        }
        Ok(())
    }
}
