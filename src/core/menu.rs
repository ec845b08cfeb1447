//! Menu business logic - Food items and selection pricing.
//!
//! Food items are the priced entries a session can offer. A selection is priced by
//! summing the prices of the picked items, which is what turns a session order into
//! a transaction amount.

use crate::{
    core::validation::{require_text, validate_amount},
    entities::{FoodItem, FoodItemModel, FoodKind, food_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Separator between item names in a transaction note.
pub const NOTE_SEPARATOR: &str = " + ";

/// Fields accepted when adding a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFoodItem {
    /// Item name, unique across the menu
    pub name: String,
    /// Main or side
    #[serde(rename = "type")]
    pub kind: FoodKind,
    /// Price in đồng
    pub price: i64,
}

/// Partial update of a menu item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItemPatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New section
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FoodKind>,
    /// New price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

/// Price and note for a set of picked item names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionQuote {
    /// Sum of the matched items' prices
    pub amount: i64,
    /// Matched item names joined with [`NOTE_SEPARATOR`]
    pub note: String,
    /// Picked names with no menu entry
    pub unknown: Vec<String>,
}

/// Prices a selection against the menu.
///
/// Names are matched exactly after trimming; blanks are ignored and anything not on
/// the menu is reported in `unknown` instead of failing.
#[must_use]
pub fn price_selection(items: &[String], menu: &[FoodItemModel]) -> SelectionQuote {
    let mut amount = 0;
    let mut matched: Vec<&str> = Vec::new();
    let mut unknown = Vec::new();

    for name in items.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        match menu.iter().find(|item| item.name == name) {
            Some(item) => {
                amount = item.price.saturating_add(amount);
                matched.push(item.name.as_str());
            }
            None => unknown.push(name.to_string()),
        }
    }

    SelectionQuote {
        amount,
        note: matched.join(NOTE_SEPARATOR),
        unknown,
    }
}

/// Lists the menu, main dishes first, then by name.
pub async fn list_food_items(db: &DatabaseConnection) -> Result<Vec<FoodItemModel>> {
    FoodItem::find()
        .order_by_asc(food_item::Column::Kind)
        .order_by_asc(food_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a menu item by ID.
pub async fn get_food_item_by_id(
    db: &DatabaseConnection,
    item_id: &str,
) -> Result<Option<FoodItemModel>> {
    FoodItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn ensure_name_free(db: &DatabaseConnection, name: &str, except: Option<&str>) -> Result<()> {
    let clash = FoodItem::find()
        .filter(food_item::Column::Name.eq(name))
        .one(db)
        .await?;

    match clash {
        Some(item) if Some(item.id.as_str()) != except => Err(Error::Conflict {
            message: format!("food item '{name}' already exists"),
        }),
        _ => Ok(()),
    }
}

/// Adds a menu item.
///
/// # Errors
/// Returns `Error::Validation` for a blank name, `Error::InvalidAmount` for a negative
/// price and `Error::Conflict` when the name is taken.
pub async fn create_food_item(db: &DatabaseConnection, new: NewFoodItem) -> Result<FoodItemModel> {
    let name = require_text("name", &new.name)?;
    let price = validate_amount(new.price)?;
    ensure_name_free(db, &name, None).await?;

    let now = chrono::Utc::now();
    let item = food_item::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name),
        kind: Set(new.kind),
        price: Set(price),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = item.insert(db).await?;
    debug!(id = %created.id, name = %created.name, price = created.price, "Added food item");
    Ok(created)
}

/// Updates a menu item.
///
/// # Errors
/// Returns `Error::FoodItemNotFound` for an unknown id, plus the validation errors of
/// [`create_food_item`].
pub async fn update_food_item(
    db: &DatabaseConnection,
    item_id: &str,
    patch: FoodItemPatch,
) -> Result<FoodItemModel> {
    let current = get_food_item_by_id(db, item_id)
        .await?
        .ok_or_else(|| Error::FoodItemNotFound {
            id: item_id.to_string(),
        })?;

    let mut active: food_item::ActiveModel = current.into();
    if let Some(name) = patch.name {
        let name = require_text("name", &name)?;
        ensure_name_free(db, &name, Some(item_id)).await?;
        active.name = Set(name);
    }
    if let Some(kind) = patch.kind {
        active.kind = Set(kind);
    }
    if let Some(price) = patch.price {
        active.price = Set(validate_amount(price)?);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Removes a menu item. Sessions that still list its name simply stop matching it.
///
/// # Errors
/// Returns `Error::FoodItemNotFound` when nothing was deleted.
pub async fn delete_food_item(db: &DatabaseConnection, item_id: &str) -> Result<()> {
    let result = FoodItem::delete_by_id(item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::FoodItemNotFound {
            id: item_id.to_string(),
        });
    }
    info!(id = item_id, "Removed food item");
    Ok(())
}
