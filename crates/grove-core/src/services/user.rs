use std::sync::Arc;

use crate::domain::{NewUser, User, UserProfile};
use crate::error::{DomainError, RepoError};
use crate::ports::UserRepository;

/// User use cases.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Register `user`. An unverified registration for the same email is
    /// replaced; a verified one blocks the new registration.
    pub async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        user.validate()?;

        if let Some(existing) = self.repo.find_by_email(&user.email).await? {
            if existing.email_verified {
                return Err(DomainError::Duplicate("verified user exists".to_string()));
            }
            if let Err(e) = self.repo.delete(existing.id).await {
                tracing::warn!(user_id = existing.id, error = %e, "failed to discard unverified user");
            }
        }

        let created = self.repo.create(user).await?;
        tracing::info!(user_id = created.id, "user registered");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.repo.find_by_email(email).await?)
    }

    pub async fn verify(&self, id: i64) -> Result<(), DomainError> {
        self.repo.verify(id).await?;
        tracing::info!(user_id = id, "user email verified");
        Ok(())
    }

    pub async fn update(&self, id: i64, profile: UserProfile) -> Result<User, DomainError> {
        self.repo.update(id, profile).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("user", id),
            other => other.into(),
        })
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        Ok(self.repo.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::StubUserRepository;

    fn registration(email: &str, name: &str) -> NewUser {
        NewUser::new(
            email,
            UserProfile {
                display_name: Some(name.to_string()),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_create_replaces_unverified_user() {
        let repo = Arc::new(StubUserRepository::default());
        let service = UserService::new(repo.clone());

        let first = service.create(registration("a@example.com", "first")).await.unwrap();
        let second = service.create(registration("a@example.com", "second")).await.unwrap();

        assert_ne!(first.id, second.id);
        let current = service.get_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.profile.display_name.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_create_rejects_when_verified_user_exists() {
        let repo = Arc::new(StubUserRepository::default());
        let service = UserService::new(repo);

        let user = service.create(registration("b@example.com", "b")).await.unwrap();
        service.verify(user.id).await.unwrap();

        let err = service
            .create(registration("b@example.com", "again"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate(msg) if msg == "verified user exists"));
    }

    #[tokio::test]
    async fn test_update_keeps_unspecified_fields() {
        let service = UserService::new(Arc::new(StubUserRepository::default()));
        let user = service.create(registration("c@example.com", "cee")).await.unwrap();

        let updated = service
            .update(
                user.id,
                UserProfile {
                    about: Some("hello".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.profile.display_name.as_deref(), Some("cee"));
        assert_eq!(updated.profile.about.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_user() {
        let service = UserService::new(Arc::new(StubUserRepository::default()));
        assert!(matches!(
            service.get_by_id(7).await,
            Err(DomainError::NotFound { entity_type: "user", .. })
        ));
    }
}
