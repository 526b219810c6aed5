//! Catalog administration guards: stock derivation on quantity changes,
//! delete protection, and the ledger's defensive release check.

mod common;

use polylib::books::repo::Book;
use polylib::loans::services;

use common::{available_quantity, seed_book, seed_student, test_state};

#[tokio::test]
async fn a_new_book_starts_fully_available() {
    let state = test_state().await;
    let book = seed_book(&state, "Refactoring", 3).await;

    assert_eq!(book.quantity, 3);
    assert_eq!(book.available_quantity, 3);
}

#[tokio::test]
async fn quantity_cannot_shrink_below_copies_on_loan() {
    let state = test_state().await;
    let user = seed_student(&state, "Ada").await;
    let book = seed_book(&state, "Refactoring", 2).await;

    let loan = services::request_loan(&state, user.id, book.id).await.unwrap();
    services::approve_loan(&state, loan.id).await.unwrap();

    // one copy is out, so the total cannot drop to zero
    let result = Book::update(&state.db, book.id, &book.title, &book.author, &book.isbn, 0)
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(available_quantity(&state, book.id).await, 1);

    // shrinking to exactly the loaned count is allowed and leaves no spares
    let updated = Book::update(&state.db, book.id, &book.title, &book.author, &book.isbn, 1)
        .await
        .unwrap()
        .expect("shrink to loaned count");
    assert_eq!(updated.quantity, 1);
    assert_eq!(updated.available_quantity, 0);
}

#[tokio::test]
async fn growing_quantity_rederives_available_copies() {
    let state = test_state().await;
    let user = seed_student(&state, "Ada").await;
    let book = seed_book(&state, "Refactoring", 2).await;

    let loan = services::request_loan(&state, user.id, book.id).await.unwrap();
    services::approve_loan(&state, loan.id).await.unwrap();

    let updated = Book::update(&state.db, book.id, &book.title, &book.author, &book.isbn, 5)
        .await
        .unwrap()
        .expect("grow quantity");
    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.available_quantity, 4);
}

#[tokio::test]
async fn books_with_active_loans_cannot_be_deleted() {
    let state = test_state().await;
    let user = seed_student(&state, "Ada").await;
    let book = seed_book(&state, "Refactoring", 1).await;

    // a pending loan already blocks deletion
    let loan = services::request_loan(&state, user.id, book.id).await.unwrap();
    assert!(!Book::delete(&state.db, book.id).await.unwrap());

    // so does an approved one
    services::approve_loan(&state, loan.id).await.unwrap();
    assert!(!Book::delete(&state.db, book.id).await.unwrap());

    // a concluded loan no longer blocks it
    services::return_book(&state, user.id, book.id).await.unwrap();
    assert!(Book::delete(&state.db, book.id).await.unwrap());
    assert!(Book::find(&state.db, book.id).await.unwrap().is_none());
}

#[tokio::test]
async fn releasing_into_a_full_shelf_is_refused() {
    let state = test_state().await;
    let book = seed_book(&state, "Refactoring", 1).await;

    // nothing is on loan, so a release would exceed the total
    assert!(!Book::release_copy(&state.db, book.id).await.unwrap());
    assert_eq!(available_quantity(&state, book.id).await, 1);
}

#[tokio::test]
async fn reserving_stops_at_zero() {
    let state = test_state().await;
    let book = seed_book(&state, "Refactoring", 2).await;

    assert!(Book::reserve_copy(&state.db, book.id).await.unwrap());
    assert!(Book::reserve_copy(&state.db, book.id).await.unwrap());
    assert!(!Book::reserve_copy(&state.db, book.id).await.unwrap());
    assert_eq!(available_quantity(&state, book.id).await, 0);
}
