use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::identity::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub matric_no: String,
    pub department: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, name, matric_no, department, role, created_at";

impl User {
    pub async fn list(db: impl SqliteExecutor<'_>) -> sqlx::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name",
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn find(db: impl SqliteExecutor<'_>, id: Uuid) -> sqlx::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Registration itself lives with the external auth collaborator; this
    /// insert exists for seeding and tests.
    pub async fn insert(
        db: impl SqliteExecutor<'_>,
        name: &str,
        matric_no: &str,
        department: &str,
        role: Role,
        created_at: OffsetDateTime,
    ) -> sqlx::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, matric_no, department, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(matric_no)
        .bind(department)
        .bind(role)
        .bind(created_at)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
