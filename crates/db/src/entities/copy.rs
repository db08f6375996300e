//! Copy entity (a user redeemed a specific code).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Copy model. Immutable once created; the `(user_id, code_id)` pair is
/// covered by a unique index, so a user can copy a given code at most once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "copy")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who copied the code.
    pub user_id: String,

    /// The code that was copied.
    pub code_id: String,

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

    #[sea_orm(
        belongs_to = "super::redeem_code::Entity",
        from = "Column::CodeId",
        to = "super::redeem_code::Column::Id",
        on_delete = "Cascade"
    )]
    RedeemCode,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::redeem_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RedeemCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
