//! The user lookup consumed by the RPC handler.

use crate::database::{Database, User, UserRepository};
use crate::error::Result;
use async_trait::async_trait;
use greeter_core::UserId;

/// Finds a user by identifier. Dropping the returned future cancels the
/// in-flight query.
#[async_trait]
pub trait UserLookup: Send + Sync + 'static {
    async fn find_by_id(&self, id: UserId) -> Result<User>;
}

/// Store-backed [`UserLookup`]. No caching, no retries.
#[derive(Clone, Debug)]
pub struct UserService {
    repository: UserRepository,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self {
            repository: UserRepository::new(db),
        }
    }
}

#[async_trait]
impl UserLookup for UserService {
    async fn find_by_id(&self, id: UserId) -> Result<User> {
        self.repository.find_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::NewUser;
    use crate::test_support::memory_database;

    #[tokio::test]
    async fn delegates_to_the_store() {
        let db = memory_database().await;
        let created = UserRepository::new(db.clone())
            .create(&NewUser::new("Alice", "alice@example.com"))
            .await
            .unwrap();

        let service = UserService::new(db);
        assert_eq!(service.find_by_id(created.id).await.unwrap(), created);
        assert!(service.find_by_id(created.id + 1).await.unwrap_err().is_row_not_found());
    }
}
