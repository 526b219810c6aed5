use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::identity::Role;
use crate::users::repo::User;

// User payloads keep the client's snake_case spelling (`matric_no`).

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub matric_no: String,
    pub department: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            matric_no: u.matric_no,
            department: u.department,
            role: u.role,
            created_at: u.created_at,
        }
    }
}
