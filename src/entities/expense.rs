//! Expense entity - A payment batch for one meal date.
//!
//! An expense is only a header: `title`, `date`, optional `notes`, the tags picked
//! when it was created, and the `is_collected` flag. Monetary totals are never stored
//! here; they are always derived from the expense's transactions (see `core::report`).

use super::names::NameList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Stable identifier (UUID text)
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    /// Human-readable title (e.g., "Ăn trưa thứ 2")
    pub title: String,
    /// Calendar date of the meal, `YYYY-MM-DD` on the wire
    pub date: Date,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Whether the organiser marked the batch as collected
    #[serde(default)]
    pub is_collected: bool,
    /// Tag names attached at creation
    #[sea_orm(column_type = "Json")]
    #[serde(default)]
    pub tag_ids: NameList,
    /// When the expense was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One expense has many transactions
    #[sea_orm(has_many = "super::expense_transaction::Entity")]
    Transactions,
    /// One expense has many ordering sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::expense_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
