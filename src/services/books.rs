//! Inventory management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a book by ID
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// List books visible to the principal: superusers see everything,
    /// other users only the books they created.
    pub async fn list(&self, claims: &UserClaims, query: &BookQuery) -> AppResult<Vec<Book>> {
        if claims.is_superuser {
            self.repository.books.list(query.skip(), query.limit()).await
        } else {
            self.repository
                .books
                .list_by_owner(&claims.sub, query.skip(), query.limit())
                .await
        }
    }

    /// Create a new book owned by the principal
    pub async fn create(&self, book: CreateBook, author: &str) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if book.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        self.repository.books.create(&book, author).await
    }

    /// Partially update a book. A negative count is rejected before any
    /// write; the borrow tracker depends on counts staying non-negative.
    pub async fn update(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        self.repository.books.update(id, &update).await
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<Book> {
        self.repository.books.delete(id).await
    }
}
