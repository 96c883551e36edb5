//! PostgreSQL repository implementations.
//!
//! Rows are deleted logically: every read filters on `is_deleted = false`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

use grove_core::domain::{Fruit, NewFruit, NewUser, User, UserProfile};
use grove_core::error::RepoError;
use grove_core::ports::{FruitRepository, UserRepository};

use super::entity::fruit::{self, Entity as FruitEntity};
use super::entity::user::{self, Entity as UserEntity};

fn db_err(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// PostgreSQL fruit repository.
pub struct PostgresFruitRepository {
    db: DbConn,
}

impl PostgresFruitRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub(crate) fn sql_log(self) -> String {
        format!("{:?}", self.db.into_transaction_log())
    }
}

#[async_trait]
impl FruitRepository for PostgresFruitRepository {
    async fn find_all(&self) -> Result<Vec<Fruit>, RepoError> {
        let rows = FruitEntity::find()
            .filter(fruit::Column::IsDeleted.eq(false))
            .order_by_asc(fruit::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Fruit>, RepoError> {
        let row = FruitEntity::find_by_id(id)
            .filter(fruit::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, new_fruit: NewFruit) -> Result<Fruit, RepoError> {
        let now = Utc::now().into();
        let model = fruit::ActiveModel {
            id: NotSet,
            name: Set(new_fruit.name),
            price: Set(new_fruit.price),
            is_deleted: Set(false),
            is_enabled: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i64, new_fruit: NewFruit) -> Result<Fruit, RepoError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = FruitEntity::update_many()
            .col_expr(fruit::Column::Name, Expr::value(new_fruit.name))
            .col_expr(fruit::Column::Price, Expr::value(new_fruit.price))
            .col_expr(fruit::Column::UpdatedAt, Expr::value(now))
            .filter(fruit::Column::Id.eq(id))
            .filter(fruit::Column::IsDeleted.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        FruitEntity::update_many()
            .col_expr(fruit::Column::IsDeleted, Expr::value(true))
            .col_expr(fruit::Column::UpdatedAt, Expr::value(now))
            .filter(fruit::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub(crate) fn sql_log(self) -> String {
        format!("{:?}", self.db.into_transaction_log())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let row = UserEntity::find_by_id(id)
            .filter(user::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let row = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::IsDeleted.eq(false))
            .filter(user::Column::IsEnabled.eq(true))
            .order_by_desc(user::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let verified = UserEntity::find()
            .filter(user::Column::Email.eq(new_user.email.as_str()))
            .filter(user::Column::EmailVerified.eq(true))
            .filter(user::Column::IsDeleted.eq(false))
            .filter(user::Column::IsEnabled.eq(true))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if verified.is_some() {
            return Err(RepoError::Constraint("verified user exists".to_string()));
        }

        let now = Utc::now().into();
        let model = user::ActiveModel {
            id: NotSet,
            email: Set(new_user.email),
            email_verified: Set(false),
            last_login_at: Set(now),
            display_name: Set(new_user.profile.display_name),
            about: Set(new_user.profile.about),
            avatar_url: Set(new_user.profile.avatar_url),
            is_deleted: Set(false),
            is_enabled: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn verify(&self, id: i64) -> Result<(), RepoError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        UserEntity::update_many()
            .col_expr(user::Column::EmailVerified, Expr::value(true))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn update(&self, id: i64, profile: UserProfile) -> Result<User, RepoError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let mut query = UserEntity::update_many().col_expr(user::Column::UpdatedAt, Expr::value(now));
        if let Some(display_name) = profile.display_name {
            query = query.col_expr(user::Column::DisplayName, Expr::value(display_name));
        }
        if let Some(about) = profile.about {
            query = query.col_expr(user::Column::About, Expr::value(about));
        }
        if let Some(avatar_url) = profile.avatar_url {
            query = query.col_expr(user::Column::AvatarUrl, Expr::value(avatar_url));
        }

        let result = query
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::IsDeleted.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        UserEntity::update_many()
            .col_expr(user::Column::IsDeleted, Expr::value(true))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("@example.com"), "***@example.com");
        assert_eq!(mask_email("nobody"), "***");
    }
}
