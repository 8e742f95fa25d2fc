//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;

const USER_COLUMNS: &str = r#"
    SELECT u.id, u.email, u.password_hash, u.role_id, r.name AS role_name,
           u.first_name, u.last_name, u.national_id, u.created_at
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// The UNIQUE constraint on `users.email` is the authority on duplicates;
    /// a violation comes back as `Duplicate`.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, national_id, email, password_hash, role_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.national_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.id())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::unique_or(e, || format!("User '{}' already exists", user.email)))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            role_name: user.role.display_name().to_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            national_id: user.national_id,
            created_at: now,
        })
    }

    /// Check whether an email is already registered
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.is_some())
    }

    /// Get a user (joined with its role) by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let sql = format!("{} WHERE u.email = ?", USER_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }
}
