//! Role reference data

use crate::error::DbError;
use crate::models::RoleRecord;
use crate::repository::Database;

impl Database {
    /// List the seeded roles
    pub async fn list_roles(&self) -> Result<Vec<RoleRecord>, DbError> {
        let rows = sqlx::query("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| RoleRecord::try_from(row).map_err(DbError::from))
            .collect()
    }
}
