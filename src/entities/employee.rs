//! Employee entity - People who can be charged for a meal.
//!
//! Each employee has a display `name`, an optional `alias` that is preferred when
//! rendering, and a `gender` that only drives cosmetic icon selection.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gender recorded for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    #[sea_orm(string_value = "male")]
    Male,
    /// Female
    #[sea_orm(string_value = "female")]
    Female,
}

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Stable identifier (UUID text)
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    /// Full name
    pub name: String,
    /// Preferred display name, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Used for icon selection only
    pub gender: Gender,
}

impl Model {
    /// Name to show for this employee: alias, then name, then id.
    ///
    /// Blank strings are treated as absent.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.alias
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .or_else(|| Some(self.name.trim()).filter(|name| !name.is_empty()))
            .unwrap_or(self.id.as_str())
    }
}

/// Employees carry no foreign keys: transactions may outlive the employee they reference.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
