//! Caller identity, resolved by the upstream auth gateway.
//!
//! Login, sessions and token issuance live outside this service; requests
//! arrive with `x-user-id` / `x-user-role` headers already verified. The
//! extractor only parses them — it never mints or validates credentials.

use std::fmt;
use std::str::FromStr;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Student => write!(f, "student"),
        }
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// The resolved `{user_id, role}` pair a request acts as.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Gate for admin-only operations.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(ApiError::Unauthorized)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?
            .parse::<Role>()?;

        Ok(Identity { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).expect("build request").into_parts();
        parts
    }

    #[tokio::test]
    async fn extracts_identity_from_headers() {
        let user_id = Uuid::new_v4();
        let mut parts = parts_with(&[
            (USER_ID_HEADER, user_id.to_string().as_str()),
            (USER_ROLE_HEADER, "admin"),
        ]);

        let identity = Identity::from_request_parts(&mut parts, &())
            .await
            .expect("identity should parse");
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn missing_headers_are_unauthorized() {
        let mut parts = parts_with(&[]);
        let err = Identity::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn garbled_user_id_is_unauthorized() {
        let mut parts = parts_with(&[
            (USER_ID_HEADER, "not-a-uuid"),
            (USER_ROLE_HEADER, "student"),
        ]);
        let err = Identity::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn unknown_role_is_unauthorized() {
        let mut parts = parts_with(&[
            (USER_ID_HEADER, Uuid::new_v4().to_string().as_str()),
            (USER_ROLE_HEADER, "librarian"),
        ]);
        let err = Identity::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn students_fail_the_admin_gate() {
        let identity = Identity {
            user_id: Uuid::new_v4(),
            role: Role::Student,
        };
        assert!(matches!(
            identity.require_admin(),
            Err(ApiError::Forbidden)
        ));
    }
}
