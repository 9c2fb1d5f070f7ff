//! One-shot data population run by an operator.
//!
//! Seeds run in order and the run stops at the first failure, returning that
//! seed's error unchanged. Rows written by earlier seeds are kept. Seeds are
//! not idempotent: running them twice fails on the unique email constraint.

use super::{Database, NewUser, UserRepository};
use crate::error::{Error, Result};
use crate::telemetry::Logger;
use async_trait::async_trait;

/// A named population step.
#[async_trait]
pub trait Seed: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, db: &Database) -> Result<()>;
}

/// Inserts the two sample users.
#[derive(Clone, Copy, Debug, Default)]
pub struct UsersSeed;

const SAMPLE_USERS: [(&str, &str); 2] = [
    ("Alice", "alice@example.com"),
    ("Bob", "bob@example.com"),
];

#[async_trait]
impl Seed for UsersSeed {
    fn name(&self) -> &str {
        "users"
    }

    async fn run(&self, db: &Database) -> Result<()> {
        let repo = UserRepository::new(db.clone());
        for (name, email) in SAMPLE_USERS {
            repo.create(&NewUser::new(name, email))
                .await
                .map_err(|err| Error::Seed {
                    name: self.name().to_string(),
                    source: Box::new(err),
                })?;
        }
        Ok(())
    }
}

/// Seeds run by the `seed` command, in order.
pub fn default_seeds() -> Vec<Box<dyn Seed>> {
    vec![Box::new(UsersSeed)]
}

pub async fn run_all(db: &Database, seeds: &[Box<dyn Seed>], logger: &Logger) -> Result<()> {
    for seed in seeds {
        let name = seed.name();
        logger.in_scope(|| tracing::info!(seed = name, "running seed"));

        if let Err(err) = seed.run(db).await {
            logger.in_scope(|| tracing::error!(seed = name, error = %err, "seed failed"));
            return Err(err);
        }

        logger.in_scope(|| tracing::info!(seed = name, "completed seed"));
    }

    logger.in_scope(|| tracing::info!(count = seeds.len(), "all seeds completed"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CapturedLogs, memory_database};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::filter::LevelFilter;

    struct CountingSeed {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Seed for CountingSeed {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, _db: &Database) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Seed {
                    name: self.name.to_string(),
                    source: Box::new(Error::DatabaseClosed),
                });
            }
            Ok(())
        }
    }

    fn counting(name: &'static str, fail: bool) -> (Box<dyn Seed>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seed = CountingSeed {
            name,
            calls: Arc::clone(&calls),
            fail,
        };
        (Box::new(seed), calls)
    }

    #[tokio::test]
    async fn users_seed_inserts_sample_rows() {
        let db = memory_database().await;
        run_all(&db, &default_seeds(), &Logger::discard())
            .await
            .unwrap();

        let repo = UserRepository::new(db);
        let alice = repo.find_by_id(1).await.unwrap();
        let bob = repo.find_by_id(2).await.unwrap();
        assert_eq!((alice.name.as_str(), alice.email.as_str()), ("Alice", "alice@example.com"));
        assert_eq!((bob.name.as_str(), bob.email.as_str()), ("Bob", "bob@example.com"));
    }

    #[tokio::test]
    async fn seeding_twice_fails() {
        let db = memory_database().await;
        run_all(&db, &default_seeds(), &Logger::discard())
            .await
            .unwrap();

        let err = run_all(&db, &default_seeds(), &Logger::discard())
            .await
            .unwrap_err();
        let Error::Seed { name, source } = err else {
            panic!("expected a seed error");
        };
        assert_eq!(name, "users");
        assert!(matches!(*source, Error::Query(sqlx::Error::Database(_))));
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let db = memory_database().await;
        let logs = CapturedLogs::new();
        let (first, first_calls) = counting("first", false);
        let (second, second_calls) = counting("second", true);
        let (third, third_calls) = counting("third", false);

        let err = run_all(&db, &[first, second, third], &logs.logger(LevelFilter::INFO))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Seed { ref name, ref source } if name == "second" && matches!(**source, Error::DatabaseClosed)
        ));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            logs.messages(),
            ["running seed", "completed seed", "running seed", "seed failed"]
        );
        assert_eq!(logs.entries()[3]["level"], "ERROR");
    }

    #[tokio::test]
    async fn logs_each_seed_and_completion() {
        let db = memory_database().await;
        let logs = CapturedLogs::new();
        let (only, _) = counting("only", false);

        run_all(&db, &[only], &logs.logger(LevelFilter::INFO))
            .await
            .unwrap();

        let entries = logs.entries();
        assert_eq!(
            logs.messages(),
            ["running seed", "completed seed", "all seeds completed"]
        );
        assert_eq!(entries[0]["seed"], "only");
        assert_eq!(entries[2]["count"], 1);
    }
}
