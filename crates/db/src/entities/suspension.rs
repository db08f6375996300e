//! Suspension entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Suspension model - a time-boxed block on a user's sensitive actions.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "suspension")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The suspended user.
    pub user_id: String,

    /// Reason for the suspension.
    pub reason: String,

    /// When the suspension expires.
    pub suspended_until: DateTimeWithTimeZone,

    /// Cleared lazily when a check observes that `suspended_until` has
    /// passed, or when a newer suspension supersedes this one.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
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
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
