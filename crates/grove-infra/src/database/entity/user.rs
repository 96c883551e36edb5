//! User entity for SeaORM.

use sea_orm::entity::prelude::*;

use grove_core::domain::{User, UserProfile};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Not unique: replaced registrations stay behind as deleted rows.
    pub email: String,
    pub email_verified: bool,
    pub last_login_at: DateTimeWithTimeZone,
    pub display_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about: Option<String>,
    pub avatar_url: Option<String>,
    pub is_deleted: bool,
    pub is_enabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            email_verified: model.email_verified,
            last_login_at: model.last_login_at.into(),
            profile: UserProfile {
                display_name: model.display_name,
                about: model.about,
                avatar_url: model.avatar_url,
            },
            is_deleted: model.is_deleted,
            is_enabled: model.is_enabled,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
