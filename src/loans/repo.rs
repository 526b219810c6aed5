//! Loan record store. Single source of truth for who has what, since when.
//!
//! Status writes are compare-and-set: they name the expected prior status in
//! the WHERE clause and report back whether the row moved, so two racing
//! decisions on the same loan can never both succeed.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

/// Closed status vocabulary; invalid statuses are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    Returned,
    OnHold,
}

impl LoanStatus {
    /// Active loans block a second request for the same (user, book) pair.
    pub fn is_active(self) -> bool {
        matches!(self, LoanStatus::Pending | LoanStatus::Approved | LoanStatus::OnHold)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Pending => write!(f, "pending"),
            LoanStatus::Approved => write!(f, "approved"),
            LoanStatus::Rejected => write!(f, "rejected"),
            LoanStatus::Returned => write!(f, "returned"),
            LoanStatus::OnHold => write!(f, "on-hold"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub status: LoanStatus,
    pub request_date: OffsetDateTime,
    pub approval_date: Option<OffsetDateTime>,
    pub due_date: Option<OffsetDateTime>,
    pub return_date: Option<OffsetDateTime>,
    pub fine: Option<i64>,
}

const LOAN_COLUMNS: &str =
    "id, book_id, user_id, status, request_date, approval_date, due_date, return_date, fine";

impl Loan {
    pub async fn insert(
        db: impl SqliteExecutor<'_>,
        user_id: Uuid,
        book_id: Uuid,
        request_date: OffsetDateTime,
    ) -> sqlx::Result<Loan> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            r#"
            INSERT INTO loans (id, book_id, user_id, status, request_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {LOAN_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(user_id)
        .bind(LoanStatus::Pending)
        .bind(request_date)
        .fetch_one(db)
        .await?;
        Ok(loan)
    }

    pub async fn find(db: impl SqliteExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(loan)
    }

    /// The caller's single approved loan for a book, if any.
    pub async fn find_approved(
        db: impl SqliteExecutor<'_>,
        user_id: Uuid,
        book_id: Uuid,
    ) -> sqlx::Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            r#"
            SELECT {LOAN_COLUMNS}
            FROM loans
            WHERE user_id = ?1 AND book_id = ?2 AND status = ?3
            "#,
        ))
        .bind(user_id)
        .bind(book_id)
        .bind(LoanStatus::Approved)
        .fetch_optional(db)
        .await?;
        Ok(loan)
    }

    /// Whether the user already holds a pending/approved/on-hold loan for the book.
    pub async fn has_active(
        db: impl SqliteExecutor<'_>,
        user_id: Uuid,
        book_id: Uuid,
    ) -> sqlx::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loans
            WHERE user_id = ?1 AND book_id = ?2
              AND status IN ('pending', 'approved', 'on-hold')
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(db)
        .await?;
        Ok(count > 0)
    }

    /// Lists loans, newest request first. `user` narrows to one borrower
    /// (student visibility); `status` is the optional query filter.
    pub async fn list(
        db: impl SqliteExecutor<'_>,
        user: Option<Uuid>,
        status: Option<LoanStatus>,
    ) -> sqlx::Result<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            r#"
            SELECT {LOAN_COLUMNS}
            FROM loans
            WHERE (?1 IS NULL OR user_id = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY request_date DESC
            "#,
        ))
        .bind(user)
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(loans)
    }

    pub async fn count_pending(db: impl SqliteExecutor<'_>) -> sqlx::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = ?1")
            .bind(LoanStatus::Pending)
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// pending → approved, stamping approval and due dates. `None` when the
    /// loan was no longer pending.
    pub async fn mark_approved(
        db: impl SqliteExecutor<'_>,
        id: Uuid,
        approval_date: OffsetDateTime,
        due_date: OffsetDateTime,
    ) -> sqlx::Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            r#"
            UPDATE loans
            SET status = ?1, approval_date = ?2, due_date = ?3
            WHERE id = ?4 AND status = ?5
            RETURNING {LOAN_COLUMNS}
            "#,
        ))
        .bind(LoanStatus::Approved)
        .bind(approval_date)
        .bind(due_date)
        .bind(id)
        .bind(LoanStatus::Pending)
        .fetch_optional(db)
        .await?;
        Ok(loan)
    }

    /// pending → rejected or on-hold. `None` when the loan was no longer pending.
    pub async fn mark_decided(
        db: impl SqliteExecutor<'_>,
        id: Uuid,
        to: LoanStatus,
    ) -> sqlx::Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            r#"
            UPDATE loans
            SET status = ?1
            WHERE id = ?2 AND status = ?3
            RETURNING {LOAN_COLUMNS}
            "#,
        ))
        .bind(to)
        .bind(id)
        .bind(LoanStatus::Pending)
        .fetch_optional(db)
        .await?;
        Ok(loan)
    }

    /// approved → returned, stamping the return date and fine. `None` when
    /// the loan was no longer approved.
    pub async fn mark_returned(
        db: impl SqliteExecutor<'_>,
        id: Uuid,
        return_date: OffsetDateTime,
        fine: i64,
    ) -> sqlx::Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            r#"
            UPDATE loans
            SET status = ?1, return_date = ?2, fine = ?3
            WHERE id = ?4 AND status = ?5
            RETURNING {LOAN_COLUMNS}
            "#,
        ))
        .bind(LoanStatus::Returned)
        .bind(return_date)
        .bind(fine)
        .bind(id)
        .bind(LoanStatus::Approved)
        .fetch_optional(db)
        .await?;
        Ok(loan)
    }
}
