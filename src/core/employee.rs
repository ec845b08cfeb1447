//! Employee business logic - Handles all employee-related operations.
//!
//! Provides functions for registering, listing, updating and removing employees.
//! All functions are async and return Result types for error handling.

use crate::{
    core::validation::{optional_text, require_text},
    entities::{Employee, EmployeeModel, Gender, employee},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Fields accepted when registering an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    /// Full name
    pub name: String,
    /// Preferred display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Gender used for icon selection
    pub gender: Gender,
}

/// Partial update of an employee. `None` leaves a field untouched; an empty alias
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    /// New full name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// New gender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Lists every employee ordered by name.
///
/// This is the list the expense form and the dashboards pick employees from.
pub async fn list_employees(db: &DatabaseConnection) -> Result<Vec<EmployeeModel>> {
    Employee::find()
        .order_by_asc(employee::Column::Name)
        .order_by_asc(employee::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an employee by ID, returning None if not found.
pub async fn get_employee_by_id(
    db: &DatabaseConnection,
    employee_id: &str,
) -> Result<Option<EmployeeModel>> {
    Employee::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new employee.
///
/// The name is trimmed and must not be empty; a blank alias is stored as none.
///
/// # Errors
/// Returns `Error::Validation` when the name is blank.
pub async fn create_employee(db: &DatabaseConnection, new: NewEmployee) -> Result<EmployeeModel> {
    let name = require_text("name", &new.name)?;

    let model = employee::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name),
        alias: Set(optional_text(new.alias)),
        gender: Set(new.gender),
    };

    let created = model.insert(db).await?;
    info!(id = %created.id, name = %created.name, "Registered employee");
    Ok(created)
}

/// Applies a partial update to an employee.
///
/// # Errors
/// Returns `Error::EmployeeNotFound` for an unknown id and `Error::Validation` when the
/// new name is blank.
pub async fn update_employee(
    db: &DatabaseConnection,
    employee_id: &str,
    patch: EmployeePatch,
) -> Result<EmployeeModel> {
    let current = get_employee_by_id(db, employee_id)
        .await?
        .ok_or_else(|| Error::EmployeeNotFound {
            id: employee_id.to_string(),
        })?;

    let mut active: employee::ActiveModel = current.into();
    if let Some(name) = patch.name {
        active.name = Set(require_text("name", &name)?);
    }
    if let Some(alias) = patch.alias {
        active.alias = Set(optional_text(Some(alias)));
    }
    if let Some(gender) = patch.gender {
        active.gender = Set(gender);
    }

    active.update(db).await.map_err(Into::into)
}

/// Removes an employee.
///
/// Their transactions are kept; reports treat them as belonging to an unknown employee.
///
/// # Errors
/// Returns `Error::EmployeeNotFound` when nothing was deleted.
pub async fn delete_employee(db: &DatabaseConnection, employee_id: &str) -> Result<()> {
    let result = Employee::delete_by_id(employee_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::EmployeeNotFound {
            id: employee_id.to_string(),
        });
    }
    info!(id = employee_id, "Removed employee");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::transaction::{TransactionFilter, filter_transactions},
        test_utils::*,
    };

    #[tokio::test]
    async fn test_create_and_list_employees() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_employee(&db, "Trần Thị Bình").await?;
        let an = create_employee(
            &db,
            NewEmployee {
                name: "  Nguyễn Văn An ".to_string(),
                alias: Some("   ".to_string()),
                gender: Gender::Male,
            },
        )
        .await?;

        assert_eq!(an.name, "Nguyễn Văn An");
        assert_eq!(an.alias, None);

        let all = list_employees(&db).await?;
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Nguyễn Văn An", "Trần Thị Bình"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_employee_requires_name() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_employee(
            &db,
            NewEmployee {
                name: String::new(),
                alias: None,
                gender: Gender::Female,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_employee() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_employee(&db, "Lê Chi").await?;

        let updated = update_employee(
            &db,
            &created.id,
            EmployeePatch {
                alias: Some("Chi".to_string()),
                ..EmployeePatch::default()
            },
        )
        .await?;
        assert_eq!(updated.display_name(), "Chi");
        assert_eq!(updated.name, "Lê Chi");

        let blank = update_employee(
            &db,
            &created.id,
            EmployeePatch {
                name: Some(" ".to_string()),
                ..EmployeePatch::default()
            },
        )
        .await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        let missing = update_employee(&db, "missing", EmployeePatch::default()).await;
        assert!(matches!(missing, Err(Error::EmployeeNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_employee_keeps_transactions() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;
        let employee = create_test_employee(&db, "Phạm Dũng").await?;
        create_test_transaction(&db, &expense.id, &employee.id, 100).await?;

        delete_employee(&db, &employee.id).await?;
        assert!(get_employee_by_id(&db, &employee.id).await?.is_none());

        let kept = filter_transactions(&db, &TransactionFilter::for_employee(&employee.id)).await?;
        assert_eq!(kept.len(), 1);

        let again = delete_employee(&db, &employee.id).await;
        assert!(matches!(again, Err(Error::EmployeeNotFound { .. })));

        Ok(())
    }
}
