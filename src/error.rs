//! Error taxonomy shared by every handler and service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::loans::lifecycle::LoanAction;
use crate::loans::repo::LoanStatus;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Book not found")]
    BookNotFound,

    #[error("Loan not found")]
    LoanNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("No copies of this book are available right now")]
    OutOfStock,

    #[error("You already have an active loan for this book")]
    DuplicateActiveLoan,

    /// Action not legal for the loan's current status. Names both so the
    /// caller can see which race or mistake it lost.
    #[error("Cannot {action} a loan that is {status}")]
    InvalidTransition {
        status: LoanStatus,
        action: LoanAction,
    },

    #[error("No borrowed copy of this book to return")]
    NoActiveLoan,

    #[error("Book still has active loans and cannot be deleted")]
    BookHasActiveLoans,

    #[error("Quantity cannot be lower than the {loaned} copies currently on loan")]
    QuantityBelowLoaned { loaned: i64 },

    #[error("Invalid ISBN")]
    InvalidIsbn,

    #[error("Missing or invalid identity headers")]
    Unauthorized,

    #[error("Admin access required")]
    Forbidden,

    /// Bookkeeping bug: stored state would stop satisfying an invariant.
    /// The offending operation is rolled back and the condition logged.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BookNotFound
            | ApiError::LoanNotFound
            | ApiError::UserNotFound
            | ApiError::NoActiveLoan => StatusCode::NOT_FOUND,
            ApiError::OutOfStock
            | ApiError::DuplicateActiveLoan
            | ApiError::InvalidTransition { .. }
            | ApiError::BookHasActiveLoans
            | ApiError::QuantityBelowLoaned { .. } => StatusCode::CONFLICT,
            ApiError::InvalidIsbn => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvariantViolation(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_status_and_action() {
        let err = ApiError::InvalidTransition {
            status: LoanStatus::Returned,
            action: LoanAction::Approve,
        };
        assert_eq!(err.to_string(), "Cannot approve a loan that is returned");
    }

    #[test]
    fn conflict_errors_map_to_409() {
        let res = ApiError::OutOfStock.into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = ApiError::DuplicateActiveLoan.into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_keep_details_out_of_the_body() {
        let res = ApiError::InvariantViolation("stock drift".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
