//! Book catalog rows and the inventory ledger.
//!
//! `reserve_copy` / `release_copy` are the ledger: conditional one-statement
//! updates whose WHERE clause carries the stock invariant, so concurrent
//! callers cannot drive `available_quantity` outside `0..=quantity`. The
//! caller learns from the row count whether the adjustment happened.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub quantity: i64,
    pub available_quantity: i64,
    pub created_at: OffsetDateTime,
}

const BOOK_COLUMNS: &str = "id, title, author, isbn, quantity, available_quantity, created_at";

impl Book {
    pub async fn list(db: impl SqliteExecutor<'_>) -> sqlx::Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title",
        ))
        .fetch_all(db)
        .await?;
        Ok(books)
    }

    pub async fn find(db: impl SqliteExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(book)
    }

    /// New books start with every copy available.
    pub async fn insert(
        db: impl SqliteExecutor<'_>,
        title: &str,
        author: &str,
        isbn: &str,
        quantity: i64,
        created_at: OffsetDateTime,
    ) -> sqlx::Result<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (id, title, author, isbn, quantity, available_quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)
            RETURNING {BOOK_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(quantity)
        .bind(created_at)
        .fetch_one(db)
        .await?;
        Ok(book)
    }

    /// Updates catalog fields, re-deriving `available_quantity` from the new
    /// total so copies currently on loan stay accounted for. `None` when the
    /// new quantity would not cover the loaned copies.
    pub async fn update(
        db: impl SqliteExecutor<'_>,
        id: Uuid,
        title: &str,
        author: &str,
        isbn: &str,
        quantity: i64,
    ) -> sqlx::Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = ?1, author = ?2, isbn = ?3, quantity = ?4,
                available_quantity = ?4 - (quantity - available_quantity)
            WHERE id = ?5 AND ?4 >= quantity - available_quantity
            RETURNING {BOOK_COLUMNS}
            "#,
        ))
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(quantity)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(book)
    }

    /// Deletes the book unless any active loan still references it.
    pub async fn delete(db: impl SqliteExecutor<'_>, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = ?1
              AND NOT EXISTS (
                  SELECT 1 FROM loans
                  WHERE book_id = ?1
                    AND status IN ('pending', 'approved', 'on-hold')
              )
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Takes one copy off the shelf. `false` when none are available — the
    /// WHERE clause makes concurrent reservations of the last copy pick
    /// exactly one winner.
    pub async fn reserve_copy(db: impl SqliteExecutor<'_>, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = available_quantity - 1
            WHERE id = ?1 AND available_quantity > 0
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Puts one copy back. `false` when the book is already full, which
    /// means a double release and must be treated as an invariant violation.
    pub async fn release_copy(db: impl SqliteExecutor<'_>, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = available_quantity + 1
            WHERE id = ?1 AND available_quantity < quantity
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
