use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::identity::Identity;
use crate::state::AppState;

use super::dto::UserResponse;
use super::repo::User;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state))]
async fn list_users(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<Vec<UserResponse>>> {
    identity.require_admin()?;
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    identity.require_admin()?;
    let user = User::find(&state.db, id).await?.ok_or(ApiError::UserNotFound)?;
    Ok(Json(user.into()))
}
