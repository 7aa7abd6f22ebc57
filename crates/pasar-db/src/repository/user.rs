//! # User Repository
//!
//! Accounts behind sign-up, the profile page and the admin users screen.
//!
//! Passwords reach this layer already hashed; the hash is stored and
//! replaced as an opaque string and never read back into a summary.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pasar_core::{ProfileUpdate, UserSummary};

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user with a freshly generated id.
    ///
    /// ## Returns
    /// * `Ok(UserSummary)` - The stored user
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, user: &NewUser) -> DbResult<UserSummary> {
        debug!(email = %user.email, "Inserting user");

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, is_admin, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, &user.email))?;

        Ok(UserSummary {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            created_at: now,
        })
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserSummary>> {
        let user = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, is_admin, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Rows for the admin users screen, oldest account first.
    pub async fn list_summaries(&self) -> DbResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, is_admin, created_at FROM users ORDER BY created_at, name",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Applies a profile update.
    ///
    /// `password_hash` is the hash of [`ProfileUpdate::new_password`]; `None`
    /// keeps the stored hash.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No such user
    /// * `Err(DbError::UniqueViolation)` - Email taken by another account
    pub async fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
        password_hash: Option<&str>,
    ) -> DbResult<UserSummary> {
        debug!(id = %id, password_changed = password_hash.is_some(), "Updating profile");

        let user = sqlx::query_as::<_, UserSummary>(
            r#"
            UPDATE users
            SET
                name = ?2,
                email = ?3,
                password_hash = COALESCE(?4, password_hash),
                updated_at = ?5
            WHERE id = ?1
            RETURNING id, name, email, is_admin, created_at
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(update.email.trim())
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, &update.email))?;

        user.ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes a user. Their orders stay, with the user reference nulled.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn duplicate_email(err: sqlx::Error, email: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field == "users.email" => {
            DbError::duplicate(field, email.trim())
        }
        other => other,
    }
}
