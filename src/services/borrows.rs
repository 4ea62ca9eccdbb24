//! Borrow tracking service

use crate::{
    error::AppResult,
    models::{book::Book, borrow::BorrowHistory, user::UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for the given user
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<(Book, BorrowHistory)> {
        let (book, entry) = self.repository.borrows.borrow(book_id, user_id).await?;
        tracing::info!(
            book_id,
            user_id,
            remaining = book.count,
            "Book borrowed"
        );
        Ok((book, entry))
    }

    /// Return a book for the given user
    pub async fn return_book(
        &self,
        book_id: i32,
        user_id: i32,
    ) -> AppResult<(Book, BorrowHistory)> {
        let (book, entry) = self.repository.borrows.return_book(book_id, user_id).await?;
        tracing::info!(
            book_id,
            user_id,
            available = book.count,
            "Book returned"
        );
        Ok((book, entry))
    }

    /// Borrow history for a user. Superusers may inspect anyone's
    /// history; everyone else only their own.
    pub async fn history_for(
        &self,
        claims: &UserClaims,
        user_id: i32,
    ) -> AppResult<Vec<BorrowHistory>> {
        claims.require_superuser_or_self(user_id)?;
        // Verify the target user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.get_user_history(user_id).await
    }
}
