//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::Book, borrow::BorrowHistory},
};

use super::AuthenticatedUser;

/// Borrow/return response: the updated book and the affected history row
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub book: Book,
    pub history: BorrowHistory,
}

/// Borrow a book as the current principal
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book borrowed", body = BorrowResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BorrowResponse>> {
    let (book, history) = state
        .services
        .borrows
        .borrow(book_id, claims.user_id)
        .await?;

    Ok(Json(BorrowResponse { book, history }))
}

/// Return a borrowed book as the current principal
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No open loan for this book and user")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BorrowResponse>> {
    let (book, history) = state
        .services
        .borrows
        .return_book(book_id, claims.user_id)
        .await?;

    Ok(Json(BorrowResponse { book, history }))
}

/// Get borrow history for a user. Superusers may view anyone's history;
/// other principals only their own.
#[utoipa::path(
    get,
    path = "/users/{id}/history",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Borrow history, oldest first", body = Vec<BorrowHistory>),
        (status = 403, description = "Cannot access another user's history"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowHistory>>> {
    let history = state.services.borrows.history_for(&claims, user_id).await?;
    Ok(Json(history))
}
