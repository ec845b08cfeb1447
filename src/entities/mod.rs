//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each `Model` also serves as the JSON shape exchanged over the HTTP API
//! (camelCase fields, primary key serialized as `_id`).

pub mod employee;
pub mod expense;
pub mod expense_transaction;
pub mod food_item;
pub mod names;
pub mod session;
pub mod tag;

// Re-export specific types to avoid conflicts
pub use employee::{
    Column as EmployeeColumn, Entity as Employee, Gender, Model as EmployeeModel,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use expense_transaction::{
    Column as TransactionColumn, Entity as ExpenseTransaction, Model as TransactionModel,
    PaymentStatus,
};
pub use food_item::{Column as FoodItemColumn, Entity as FoodItem, FoodKind, Model as FoodItemModel};
pub use names::NameList;
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use tag::{Column as TagColumn, Entity as Tag, Model as TagModel};
