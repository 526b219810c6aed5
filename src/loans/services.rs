//! Loan orchestration.
//!
//! Every operation here runs inside one database transaction and is the only
//! code allowed to move a loan's status and the book's available stock
//! together. The state machine decides what is legal, the ledger updates in
//! `books::repo` decide who wins a race, and an error anywhere rolls the
//! whole operation back.

use sqlx::{Sqlite, Transaction};
use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::books::repo::Book;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::fine::compute_fine;
use super::lifecycle::{transition, LoanAction, StockEffect};
use super::repo::{Loan, LoanStatus};

/// Creates a `pending` loan. Availability is deliberately not checked here;
/// stock is only committed at approval time.
pub async fn request_loan(state: &AppState, user_id: Uuid, book_id: Uuid) -> ApiResult<Loan> {
    let mut tx = state.db.begin().await?;

    Book::find(&mut *tx, book_id)
        .await?
        .ok_or(ApiError::BookNotFound)?;
    if Loan::has_active(&mut *tx, user_id, book_id).await? {
        return Err(ApiError::DuplicateActiveLoan);
    }

    let loan = Loan::insert(&mut *tx, user_id, book_id, OffsetDateTime::now_utc())
        .await
        .map_err(|e| match &e {
            // the partial unique index backstops racing requests
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::DuplicateActiveLoan,
            _ => ApiError::Database(e),
        })?;

    tx.commit().await?;
    info!(loan_id = %loan.id, %user_id, %book_id, "loan requested");
    Ok(loan)
}

/// Approves a `pending` loan: reserves a copy and stamps approval/due dates.
pub async fn approve_loan(state: &AppState, loan_id: Uuid) -> ApiResult<Loan> {
    let mut tx = state.db.begin().await?;

    let loan = Loan::find(&mut *tx, loan_id)
        .await?
        .ok_or(ApiError::LoanNotFound)?;
    let (_, effect) = transition(loan.status, LoanAction::Approve)?;
    apply_stock_effect(&mut tx, loan.book_id, effect).await?;

    let now = OffsetDateTime::now_utc();
    let due = now + Duration::days(state.config.loan.period_days);
    let Some(approved) = Loan::mark_approved(&mut *tx, loan_id, now, due).await? else {
        return Err(lost_race(&mut tx, loan_id, LoanAction::Approve, loan.status).await?);
    };

    tx.commit().await?;
    info!(
        loan_id = %approved.id,
        book_id = %approved.book_id,
        due_date = %due,
        "loan approved"
    );
    Ok(approved)
}

/// Rejects a `pending` loan. Never touches stock: a pending loan has not
/// reserved anything.
pub async fn reject_loan(state: &AppState, loan_id: Uuid) -> ApiResult<Loan> {
    decide_loan(state, loan_id, LoanAction::Reject).await
}

/// Places a `pending` loan on hold. Reserved administrative extension
/// point; a held loan stays active for the duplicate-request check but is
/// terminal otherwise.
pub async fn hold_loan(state: &AppState, loan_id: Uuid) -> ApiResult<Loan> {
    decide_loan(state, loan_id, LoanAction::Hold).await
}

async fn decide_loan(state: &AppState, loan_id: Uuid, action: LoanAction) -> ApiResult<Loan> {
    let mut tx = state.db.begin().await?;

    let loan = Loan::find(&mut *tx, loan_id)
        .await?
        .ok_or(ApiError::LoanNotFound)?;
    let (next, effect) = transition(loan.status, action)?;
    apply_stock_effect(&mut tx, loan.book_id, effect).await?;

    let Some(decided) = Loan::mark_decided(&mut *tx, loan_id, next).await? else {
        return Err(lost_race(&mut tx, loan_id, action, loan.status).await?);
    };

    tx.commit().await?;
    info!(loan_id = %decided.id, status = %decided.status, "loan decided");
    Ok(decided)
}

/// Returns the caller's approved copy of a book: releases the copy, stamps
/// the return date and computes the fine.
pub async fn return_book(state: &AppState, user_id: Uuid, book_id: Uuid) -> ApiResult<Loan> {
    let mut tx = state.db.begin().await?;

    let loan = Loan::find_approved(&mut *tx, user_id, book_id)
        .await?
        .ok_or(ApiError::NoActiveLoan)?;
    let (_, effect) = transition(loan.status, LoanAction::Return)?;
    apply_stock_effect(&mut tx, loan.book_id, effect).await?;

    let due = loan.due_date.ok_or_else(|| {
        ApiError::InvariantViolation(format!("approved loan {} has no due date", loan.id))
    })?;
    let now = OffsetDateTime::now_utc();
    let fine = compute_fine(due, now, state.config.loan.fine_per_day);

    // A lost CAS here means the approved loan is gone from the caller's
    // point of view.
    let returned = Loan::mark_returned(&mut *tx, loan.id, now, fine)
        .await?
        .ok_or(ApiError::NoActiveLoan)?;

    tx.commit().await?;
    info!(loan_id = %returned.id, %book_id, fine, "book returned");
    Ok(returned)
}

/// Applies the stock adjustment the state machine asked for, inside the
/// operation's transaction.
async fn apply_stock_effect(
    tx: &mut Transaction<'_, Sqlite>,
    book_id: Uuid,
    effect: StockEffect,
) -> ApiResult<()> {
    match effect {
        StockEffect::None => Ok(()),
        StockEffect::Reserve => {
            if Book::reserve_copy(&mut **tx, book_id).await? {
                Ok(())
            } else {
                Err(ApiError::OutOfStock)
            }
        }
        StockEffect::Release => {
            if Book::release_copy(&mut **tx, book_id).await? {
                Ok(())
            } else {
                Err(ApiError::InvariantViolation(format!(
                    "release would push book {book_id} above its quantity"
                )))
            }
        }
    }
}

/// Maps a lost compare-and-set to `InvalidTransition` against the status the
/// loser now observes.
async fn lost_race(
    tx: &mut Transaction<'_, Sqlite>,
    loan_id: Uuid,
    action: LoanAction,
    last_seen: LoanStatus,
) -> Result<ApiError, sqlx::Error> {
    let status = Loan::find(&mut **tx, loan_id)
        .await?
        .map(|l| l.status)
        .unwrap_or(last_seen);
    Ok(ApiError::InvalidTransition { status, action })
}
