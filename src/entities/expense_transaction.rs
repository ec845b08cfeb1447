//! Expense transaction entity - One employee's charge against one expense.
//!
//! Each row records the `amount` owed, the `received_amount` collected so far and a
//! stored `status`. The store keeps `status` consistent with the two amounts:
//! `paid` means fully received, `unpaid` means nothing received and `partial` lies
//! strictly between.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status of a transaction, or derived for an aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing received
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Some but not all received
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully received
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl PaymentStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expense transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_transactions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Stable identifier (UUID text)
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    /// Expense this charge belongs to
    pub expense_id: String,
    /// Employee who owes the amount (may reference a removed employee)
    pub employee_id: String,
    /// Amount owed, in đồng
    pub amount: i64,
    /// Amount collected so far, in đồng
    pub received_amount: i64,
    /// Optional note, usually the ordered items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Stored status
    pub status: PaymentStatus,
    /// When the charge was recorded
    pub created_at: DateTimeUtc,
    /// When the charge was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount still owed on this row.
    #[must_use]
    pub const fn debt(&self) -> i64 {
        self.amount - self.received_amount
    }
}

/// Defines relationships between `ExpenseTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one expense
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
