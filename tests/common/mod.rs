//! Shared fixtures for integration tests: an in-memory SQLite state with
//! the real migrations applied, plus seed helpers.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use polylib::books::repo::Book;
use polylib::config::{AppConfig, LoanPolicy};
use polylib::identity::Role;
use polylib::state::AppState;
use polylib::users::repo::User;

pub const PERIOD_DAYS: i64 = 14;
pub const FINE_PER_DAY: i64 = 50;

pub async fn test_state() -> AppState {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse in-memory url")
        .foreign_keys(true);

    // One connection, never reaped, so the in-memory database survives for
    // the whole test.
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");

    let config = Arc::new(AppConfig {
        database_url: "sqlite::memory:".into(),
        loan: LoanPolicy {
            period_days: PERIOD_DAYS,
            fine_per_day: FINE_PER_DAY,
        },
    });
    AppState::from_parts(db, config)
}

pub async fn seed_student(state: &AppState, name: &str) -> User {
    let matric_no = format!("MAT/{}", Uuid::new_v4().simple());
    User::insert(
        &state.db,
        name,
        &matric_no,
        "Computer Science",
        Role::Student,
        OffsetDateTime::now_utc(),
    )
    .await
    .expect("seed user")
}

pub async fn seed_book(state: &AppState, title: &str, quantity: i64) -> Book {
    Book::insert(
        &state.db,
        title,
        "Test Author",
        "9781593278281",
        quantity,
        OffsetDateTime::now_utc(),
    )
    .await
    .expect("seed book")
}

pub async fn available_quantity(state: &AppState, book_id: Uuid) -> i64 {
    Book::find(&state.db, book_id)
        .await
        .expect("query book")
        .expect("book exists")
        .available_quantity
}

/// Moves a loan's due date into the past so the next return is overdue.
pub async fn backdate_due(state: &AppState, loan_id: Uuid, by: Duration) {
    sqlx::query("UPDATE loans SET due_date = ?1 WHERE id = ?2")
        .bind(OffsetDateTime::now_utc() - by)
        .bind(loan_id)
        .execute(&state.db)
        .await
        .expect("backdate due date");
}
