//! Borrow history repository: the borrow/return state machine.
//!
//! Both transitions run inside a single transaction with the book row
//! locked (`SELECT ... FOR UPDATE`) so that two concurrent borrows
//! against the last copy serialize: one succeeds, the other observes
//! `count == 0` and fails. Nothing is written on a failed validation.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, borrow::BorrowHistory},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book: decrement the available count and append an open
    /// history row, atomically.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<(Book, BorrowHistory)> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book.count <= 0 {
            return Err(AppError::NoCopiesAvailable);
        }

        let book = sqlx::query_as::<_, Book>(
            "UPDATE books SET count = count - 1 WHERE id = $1 RETURNING *",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        let entry = sqlx::query_as::<_, BorrowHistory>(
            r#"
            INSERT INTO borrow_history (user_id, book_id, borrow_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((book, entry))
    }

    /// Return a book: close the latest open loan for (book, user) and
    /// increment the available count, atomically.
    ///
    /// Only rows with `return_date IS NULL` qualify; returning a book
    /// twice fails with `NotBorrowed` instead of re-closing the old row
    /// and inflating the count.
    pub async fn return_book(
        &self,
        book_id: i32,
        user_id: i32,
    ) -> AppResult<(Book, BorrowHistory)> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let open_loan = sqlx::query_as::<_, BorrowHistory>(
            r#"
            SELECT * FROM borrow_history
            WHERE book_id = $1 AND user_id = $2 AND return_date IS NULL
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotBorrowed)?;

        let book = sqlx::query_as::<_, Book>(
            "UPDATE books SET count = count + 1 WHERE id = $1 RETURNING *",
        )
        .bind(book.id)
        .fetch_one(&mut *tx)
        .await?;

        let entry = sqlx::query_as::<_, BorrowHistory>(
            "UPDATE borrow_history SET return_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(Utc::now())
        .bind(open_loan.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((book, entry))
    }

    /// All history rows for a user, oldest first
    pub async fn get_user_history(&self, user_id: i32) -> AppResult<Vec<BorrowHistory>> {
        let history = sqlx::query_as::<_, BorrowHistory>(
            "SELECT * FROM borrow_history WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }
}
