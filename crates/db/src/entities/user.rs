//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    /// Display name
    #[sea_orm(nullable)]
    pub name: Option<String>,

    /// Contact email
    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Access token
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    /// Denormalized suspension flag, mirrors the latest suspension record.
    /// Stale values self-correct on the next suspension check.
    #[sea_orm(default_value = false)]
    pub is_suspended: bool,

    /// When the current suspension expires (if suspended).
    #[sea_orm(nullable)]
    pub suspended_until: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::redeem_code::Entity")]
    RedeemCodes,

    #[sea_orm(has_many = "super::copy::Entity")]
    Copies,

    #[sea_orm(has_many = "super::suspension::Entity")]
    Suspensions,
}

impl Related<super::redeem_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RedeemCodes.def()
    }
}

impl Related<super::copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Copies.def()
    }
}

impl Related<super::suspension::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suspensions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
