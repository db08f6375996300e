//! Misuse log entity (append-only abuse audit trail).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of abuse that was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ActionType {
    #[sea_orm(string_value = "rapid_copying")]
    RapidCopying,
    #[sea_orm(string_value = "multiple_accounts")]
    MultipleAccounts,
    #[sea_orm(string_value = "suspicious_activity")]
    SuspiciousActivity,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Misuse log model. Created alongside a suspension when detection fires;
/// never mutated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "misuse_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The offending user.
    pub user_id: String,

    /// What kind of abuse was detected.
    pub action_type: ActionType,

    /// Free-text details about the detection.
    #[sea_orm(column_type = "Text")]
    pub details: String,

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
