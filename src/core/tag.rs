//! Tag business logic - Labels that can be attached to expenses.

use crate::{
    core::validation::require_text,
    entities::{Tag, TagModel, tag},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Fields accepted when creating a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    /// Tag name, unique
    pub name: String,
}

/// Lists every tag by name.
pub async fn list_tags(db: &DatabaseConnection) -> Result<Vec<TagModel>> {
    Tag::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a tag.
///
/// # Errors
/// Returns `Error::Validation` for a blank name and `Error::Conflict` when the name
/// is taken.
pub async fn create_tag(db: &DatabaseConnection, new: NewTag) -> Result<TagModel> {
    let name = require_text("name", &new.name)?;

    let existing = Tag::find()
        .filter(tag::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: format!("tag '{name}' already exists"),
        });
    }

    let model = tag::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name),
    };
    let created = model.insert(db).await?;
    debug!(id = %created.id, name = %created.name, "Created tag");
    Ok(created)
}
