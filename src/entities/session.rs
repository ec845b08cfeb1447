//! Session entity - A menu offered for one expense.
//!
//! While a session is active, employees pick from its `items` and their picks become
//! (or update) their transaction on the session's expense.

use super::names::NameList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Stable identifier (UUID text)
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    /// Expense the orders are charged to
    pub expense_id: String,
    /// Names of the food items on offer
    #[sea_orm(column_type = "Json")]
    pub items: NameList,
    /// Whether orders are still accepted
    pub is_active: bool,
    /// When the session was opened
    pub created_at: DateTimeUtc,
    /// When the session was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Session and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each session belongs to one expense
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
