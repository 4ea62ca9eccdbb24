//! Book (inventory) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database.
///
/// `count` is the number of copies currently available; the schema
/// enforces `count >= 0` and the borrow path refuses to go below zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Email of the principal that created the book
    pub author: String,
    pub count: i32,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Count must not be negative"))]
    pub count: Option<i32>,
}

/// Update book request; only supplied fields are changed.
/// Setting `count` here is an administrative correction that bypasses
/// the borrow/return bookkeeping.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    /// Absent = keep the current value; explicit `null` = clear it
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[validate(range(min = 0, message = "Count must not be negative"))]
    pub count: Option<i32>,
}

/// Book listing query parameters (simple offset window)
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl BookQuery {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(0, 1000)
    }
}
