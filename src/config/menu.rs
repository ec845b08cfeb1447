//! Menu seeding from config.toml
//!
//! The `[[menu]]` entries in config.toml seed the food-item table on first run. Once
//! the table holds anything, the menu is managed through the API and the file is
//! ignored.

use crate::{
    core::menu::{NewFoodItem, create_food_item},
    entities::{FoodItem, FoodKind},
    errors::Result,
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Deserialize;
use tracing::info;

/// A single `[[menu]]` entry.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MenuItemConfig {
    /// Item name
    pub name: String,
    /// Main or side
    #[serde(rename = "type")]
    pub kind: FoodKind,
    /// Price in đồng
    pub price: i64,
}

impl From<&MenuItemConfig> for NewFoodItem {
    fn from(item: &MenuItemConfig) -> Self {
        Self {
            name: item.name.clone(),
            kind: item.kind,
            price: item.price,
        }
    }
}

/// Inserts the configured menu when the food-item table is empty.
///
/// Returns how many items were inserted.
///
/// # Errors
/// Returns an error if an entry is invalid or the database write fails.
pub async fn seed_menu(db: &DatabaseConnection, items: &[MenuItemConfig]) -> Result<usize> {
    if items.is_empty() || FoodItem::find().count(db).await? > 0 {
        return Ok(0);
    }

    for item in items {
        create_food_item(db, NewFoodItem::from(item)).await?;
    }

    info!(count = items.len(), "Seeded menu from configuration");
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::menu::list_food_items, test_utils::setup_test_db};

    fn configured() -> Vec<MenuItemConfig> {
        vec![
            MenuItemConfig {
                name: "Cơm gà".to_string(),
                kind: FoodKind::Main,
                price: 35_000,
            },
            MenuItemConfig {
                name: "Canh chua".to_string(),
                kind: FoodKind::Side,
                price: 10_000,
            },
        ]
    }

    #[tokio::test]
    async fn test_seed_menu_only_once() -> Result<()> {
        let db = setup_test_db().await?;

        assert_eq!(seed_menu(&db, &configured()).await?, 2);
        assert_eq!(seed_menu(&db, &configured()).await?, 0);
        assert_eq!(list_food_items(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_menu_with_nothing_configured() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(seed_menu(&db, &[]).await?, 0);
        Ok(())
    }
}
