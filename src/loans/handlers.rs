use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::identity::Identity;
use crate::state::AppState;

use super::dto::{
    LoanListQuery, LoanResponse, PendingCountResponse, RequestLoanRequest, ReturnBookRequest,
    ReturnBookResponse,
};
use super::repo::Loan;
use super::services;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans))
        .route("/loans/pending/count", get(pending_count))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/loans/request", post(request_loan))
        .route("/loans/return", post(return_book))
        .route("/loans/:id/approve", post(approve_loan))
        .route("/loans/:id/reject", post(reject_loan))
        .route("/loans/:id/hold", post(hold_loan))
}

/// Admins see every loan; students only their own. The optional `status`
/// query narrows further.
#[instrument(skip(state))]
async fn list_loans(
    State(state): State<AppState>,
    identity: Identity,
    Query(q): Query<LoanListQuery>,
) -> ApiResult<Json<Vec<LoanResponse>>> {
    let user = if identity.is_admin() {
        None
    } else {
        Some(identity.user_id)
    };
    let loans = Loan::list(&state.db, user, q.status).await?;
    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

#[instrument(skip(state))]
async fn pending_count(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<PendingCountResponse>> {
    identity.require_admin()?;
    let count = Loan::count_pending(&state.db).await?;
    Ok(Json(PendingCountResponse { count }))
}

#[instrument(skip(state, body))]
async fn request_loan(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<RequestLoanRequest>,
) -> ApiResult<(StatusCode, Json<LoanResponse>)> {
    let loan = services::request_loan(&state, identity.user_id, body.book_id).await?;
    Ok((StatusCode::CREATED, Json(loan.into())))
}

#[instrument(skip(state))]
async fn approve_loan(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanResponse>> {
    identity.require_admin()?;
    let loan = services::approve_loan(&state, id).await?;
    Ok(Json(loan.into()))
}

#[instrument(skip(state))]
async fn reject_loan(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanResponse>> {
    identity.require_admin()?;
    let loan = services::reject_loan(&state, id).await?;
    Ok(Json(loan.into()))
}

#[instrument(skip(state))]
async fn hold_loan(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanResponse>> {
    identity.require_admin()?;
    let loan = services::hold_loan(&state, id).await?;
    Ok(Json(loan.into()))
}

#[instrument(skip(state, body))]
async fn return_book(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<ReturnBookRequest>,
) -> ApiResult<Json<ReturnBookResponse>> {
    let loan = services::return_book(&state, identity.user_id, body.book_id).await?;
    Ok(Json(ReturnBookResponse {
        status: loan.status,
        fine: loan.fine.unwrap_or(0),
    }))
}
