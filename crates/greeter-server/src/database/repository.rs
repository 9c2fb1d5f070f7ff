use super::Database;
use super::model::{NewUser, USER_COLUMNS, User, UserRow};
use crate::error::{Error, Result};
use greeter_core::UserId;

/// Queries against the `users` table.
#[derive(Clone, Debug)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts `user` and returns the stored row. A duplicate email fails
    /// with the store's constraint violation.
    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let driver = self.db.driver();
        let insert = format!(
            "INSERT INTO users (name, email) VALUES ({}, {})",
            driver.placeholder(1),
            driver.placeholder(2)
        );

        if driver.supports_returning() {
            let sql = format!("{insert} RETURNING {USER_COLUMNS}");
            let row: UserRow = sqlx::query_as(&sql)
                .bind(user.name.as_str())
                .bind(user.email.as_str())
                .fetch_one(self.db.pool())
                .await?;
            return User::try_from(row);
        }

        let result = sqlx::query(&insert)
            .bind(user.name.as_str())
            .bind(user.email.as_str())
            .execute(self.db.pool())
            .await?;
        let id = result
            .last_insert_id()
            .and_then(|id| UserId::try_from(id).ok())
            .ok_or_else(|| {
                Error::Query(sqlx::Error::Protocol(
                    "insert did not report a generated id".to_string(),
                ))
            })?;
        self.find_by_id(id).await
    }

    /// Single primary-key lookup. A miss surfaces as
    /// `Error::Query(sqlx::Error::RowNotFound)`.
    pub async fn find_by_id(&self, id: UserId) -> Result<User> {
        // No stored identifier exceeds i64::MAX.
        let Ok(id) = i64::try_from(id) else {
            return Err(Error::Query(sqlx::Error::RowNotFound));
        };

        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = {}",
            self.db.driver().placeholder(1)
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        User::try_from(row)
    }
}
