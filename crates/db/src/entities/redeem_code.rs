//! Redeem code entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "redeem_code")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who shared this code.
    pub user_id: String,

    /// Short human-readable title.
    pub title: String,

    /// The redeem code text itself.
    pub code: String,

    /// How many distinct users have copied this code. Mutated only through
    /// the copy orchestrator, never directly by clients.
    #[sea_orm(default_value = 0)]
    pub copy_count: i32,

    /// Set automatically once `copy_count` reaches 5, or manually by the
    /// owner. Archived codes are excluded from the general listing.
    #[sea_orm(default_value = false)]
    pub is_archived: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(has_many = "super::copy::Entity")]
    Copies,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Copies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
