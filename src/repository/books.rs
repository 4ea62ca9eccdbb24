//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books over a simple offset window, insertion order
    pub async fn list(&self, skip: i64, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id OFFSET $1 LIMIT $2")
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// List books created by the given owner (matched on the author email)
    pub async fn list_by_owner(&self, owner: &str, skip: i64, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author = $1 ORDER BY id OFFSET $2 LIMIT $3",
        )
        .bind(owner)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Create a new book owned by `author`
    pub async fn create(&self, book: &CreateBook, author: &str) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, description, author, count)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(author)
        .bind(book.count.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Partial update; only supplied fields are changed. An explicit
    /// null description clears the column, which COALESCE alone cannot
    /// express, hence the presence flag.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                count = COALESCE($5, count)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(update.description.is_some())
        .bind(update.description.clone().flatten())
        .bind(update.count)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book, returning the removed record.
    /// Fails with a conflict if any borrow history references the book,
    /// open or closed; history is kept for auditing.
    pub async fn delete(&self, id: i32) -> AppResult<Book> {
        let result = sqlx::query_as::<_, Book>("DELETE FROM books WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(book)) => Ok(book),
            Ok(None) => Err(AppError::NotFound(format!("Book with id {} not found", id))),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(
                AppError::Conflict("Book has borrow history and cannot be deleted".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }
}
