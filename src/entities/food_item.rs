//! Food item entity - A priced entry on the lunch menu.
//!
//! Items are either a `main` dish or a `side`. Sessions offer items by name, and an
//! employee's selection is priced by summing the matching items' prices.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu section of a food item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
    /// Main dish
    #[sea_orm(string_value = "main")]
    Main,
    /// Side dish
    #[sea_orm(string_value = "side")]
    Side,
}

/// Food item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "food_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Stable identifier (UUID text)
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    /// Unique item name (e.g., "Cơm gà xối mỡ")
    #[sea_orm(unique)]
    pub name: String,
    /// Main or side
    #[serde(rename = "type")]
    pub kind: FoodKind,
    /// Price in đồng
    pub price: i64,
    /// When the item was created
    pub created_at: DateTimeUtc,
    /// When the item was last modified
    pub updated_at: DateTimeUtc,
}

/// Food items have no relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
