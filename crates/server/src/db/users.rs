//! Database operations for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use waterline_core::{UserId, UserRole, Username};

use super::{PgStore, RepositoryError};
use crate::models::{NewUser, User, UserCredentials};
use crate::store::UserStore;

const COLUMNS: &str = "id, username, full_name, role, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    full_name: String,
    role: UserRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username '{}': {e}", row.username))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            full_name: row.full_name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO waterline.app_user (username, full_name, role, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "username already taken"))?;

        row.try_into()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {COLUMNS}, password_hash FROM waterline.app_user WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| {
            Ok(UserCredentials {
                user: row.user.try_into()?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.app_user ORDER BY username"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM waterline.app_user WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
