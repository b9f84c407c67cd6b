//! Postgres-backed user store.
//!
//! Emails are stored lowercased and matched with `lower(email)`, backed by a
//! unique index on the same expression.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use newsroom_auth::user::normalize_email;
use newsroom_auth::{Role, User, UserStore, UserSummary};
use newsroom_core::{DomainError, UserId};

use crate::db::Database;
use crate::error::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    /// Provision a user. A duplicate email is a `Conflict`.
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    pub async fn insert(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    /// Returns whether a row was removed.
    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn set_role(&self, id: &UserId, role: Role) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_role", e))?;
        expect_one_row(result.rows_affected())
    }

    #[instrument(skip(self, password_hash), fields(user_id = %id), err)]
    pub async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_uuid())
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("set_password_hash", e))?;
        expect_one_row(result.rows_affected())
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip_all, err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE lower(email) = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.map(|row| {
            let row = UserRow::from_row(&row).map_err(|e| map_sqlx_error("find_by_email", e))?;
            row.into_user()
        })
        .transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_summary_by_id(&self, id: &UserId) -> Result<Option<UserSummary>, DomainError> {
        let row = sqlx::query("SELECT name, email, role FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_summary_by_id", e))?;

        row.map(|row| {
            let name: String = row
                .try_get("name")
                .map_err(|e| map_sqlx_error("find_summary_by_id", e))?;
            let email: String = row
                .try_get("email")
                .map_err(|e| map_sqlx_error("find_summary_by_id", e))?;
            let role: String = row
                .try_get("role")
                .map_err(|e| map_sqlx_error("find_summary_by_id", e))?;
            Ok(UserSummary {
                name,
                email,
                role: parse_role(&role)?,
            })
        })
        .transpose()
    }
}

fn expect_one_row(rows_affected: u64) -> Result<(), DomainError> {
    if rows_affected == 0 {
        return Err(DomainError::NotFound);
    }
    Ok(())
}

fn parse_role(raw: &str) -> Result<Role, DomainError> {
    raw.parse()
        .map_err(|e| DomainError::validation(format!("users.role: {e}")))
}

// SQLx row types

struct UserRow {
    id: uuid::Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, DomainError> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: uuid::Uuid::now_v7(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_user() {
        let r = row("editor");
        let id = r.id;
        let user = r.into_user().unwrap();
        assert_eq!(user.id, UserId::from_uuid(id));
        assert_eq!(user.role, Role::Editor);
    }

    #[test]
    fn legacy_reader_role_maps_to_user() {
        assert_eq!(row("reader").into_user().unwrap().role, Role::User);
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        assert!(matches!(
            row("superuser").into_user(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn zero_rows_affected_is_not_found() {
        assert_eq!(expect_one_row(0), Err(DomainError::NotFound));
        assert_eq!(expect_one_row(1), Ok(()));
    }
}
