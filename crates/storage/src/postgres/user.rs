use async_trait::async_trait;
use common::{User, UserId};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use super::decode_text;
use crate::error::{DbError, UserRepositoryError};
use crate::repository::UserRepository;

#[derive(Debug, Clone, Copy, Default)]
pub struct PgUserRepository;

impl PgUserRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_user(row: PgRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
            email: row.try_get("email")?,
            role: decode_text(&row, "role")?,
            password_hash: row.try_get("password_hash")?,
            token: row.try_get("token")?,
        })
    }
}

#[async_trait]
impl UserRepository<PgConnection> for PgUserRepository {
    async fn create(&self, conn: &mut PgConnection, user: &User) -> Result<(), UserRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, role, password_hash, token)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&user.token)
        .execute(&mut *conn)
        .await
        .map_err(|e| UserRepositoryError::Create(e.into()))?;

        Ok(())
    }

    async fn read_by_email(
        &self,
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<User, UserRepositoryError> {
        let row = sqlx::query(
            "SELECT id, email, role, password_hash, token FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| UserRepositoryError::ReadByEmail(e.into()))?;

        Self::row_to_user(row).map_err(|e| UserRepositoryError::ReadByEmail(e.into()))
    }

    async fn update_token_by_email(
        &self,
        conn: &mut PgConnection,
        email: &str,
        token: &str,
    ) -> Result<(), UserRepositoryError> {
        let result = sqlx::query("UPDATE users SET token = $2 WHERE email = $1")
            .bind(email)
            .bind(token)
            .execute(&mut *conn)
            .await
            .map_err(|e| UserRepositoryError::UpdateTokenByEmail(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(UserRepositoryError::UpdateTokenByEmail(DbError::NotFound));
        }
        Ok(())
    }
}
