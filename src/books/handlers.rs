use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::identity::Identity;
use crate::state::AppState;

use super::dto::{BookResponse, CreateBookRequest, UpdateBookRequest};
use super::repo::Book;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books))
        .route("/books/:id", get(get_book))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/books", post(create_book))
        .route("/books/:id", axum::routing::put(update_book).delete(delete_book))
}

/// Shape check only: ISBN-10 (nine digits plus a digit or X check
/// character) or ISBN-13, separators allowed.
pub(crate) fn is_valid_isbn(raw: &str) -> bool {
    lazy_static! {
        static ref ISBN_RE: Regex = Regex::new(r"^(?:\d{9}[\dXx]|\d{13})$").unwrap();
    }
    let compact: String = raw.chars().filter(|c| *c != '-' && *c != ' ').collect();
    ISBN_RE.is_match(&compact)
}

#[instrument(skip(state))]
async fn list_books(State(state): State<AppState>, _identity: Identity) -> ApiResult<Json<Vec<BookResponse>>> {
    let books = Book::list(&state.db).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

#[instrument(skip(state))]
async fn get_book(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookResponse>> {
    let book = Book::find(&state.db, id).await?.ok_or(ApiError::BookNotFound)?;
    Ok(Json(book.into()))
}

#[instrument(skip(state, body))]
async fn create_book(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<CreateBookRequest>,
) -> ApiResult<(StatusCode, Json<BookResponse>)> {
    identity.require_admin()?;
    if !is_valid_isbn(&body.isbn) {
        return Err(ApiError::InvalidIsbn);
    }

    let book = Book::insert(
        &state.db,
        &body.title,
        &body.author,
        &body.isbn,
        i64::from(body.quantity),
        OffsetDateTime::now_utc(),
    )
    .await?;

    info!(book_id = %book.id, quantity = book.quantity, "book created");
    Ok((StatusCode::CREATED, Json(book.into())))
}

#[instrument(skip(state, body))]
async fn update_book(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBookRequest>,
) -> ApiResult<Json<BookResponse>> {
    identity.require_admin()?;
    if !is_valid_isbn(&body.isbn) {
        return Err(ApiError::InvalidIsbn);
    }

    let current = Book::find(&state.db, id).await?.ok_or(ApiError::BookNotFound)?;
    let updated = Book::update(
        &state.db,
        id,
        &body.title,
        &body.author,
        &body.isbn,
        i64::from(body.quantity),
    )
    .await?
    .ok_or(ApiError::QuantityBelowLoaned {
        loaned: current.quantity - current.available_quantity,
    })?;

    info!(book_id = %id, quantity = updated.quantity, "book updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
async fn delete_book(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    identity.require_admin()?;

    Book::find(&state.db, id).await?.ok_or(ApiError::BookNotFound)?;
    if !Book::delete(&state.db, id).await? {
        return Err(ApiError::BookHasActiveLoans);
    }

    info!(book_id = %id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::is_valid_isbn;

    #[test]
    fn accepts_isbn_10_and_13() {
        assert!(is_valid_isbn("9781593278281"));
        assert!(is_valid_isbn("978-1-59327-828-1"));
        assert!(is_valid_isbn("1593278284"));
        assert!(is_valid_isbn("043942089X"));
        assert!(is_valid_isbn("0 439 42089 x"));
    }

    #[test]
    fn rejects_junk() {
        assert!(!is_valid_isbn(""));
        assert!(!is_valid_isbn("not-an-isbn"));
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("97815932782811"));
        assert!(!is_valid_isbn("X781593278281"));
    }
}
