use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use greeter_core::UserId;

/// A stored user. Email is unique across all users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the caller on insert. Identifier and timestamps come
/// from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Column layout shared by every `users` query.
pub(crate) const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    name: String,
    email: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let id = UserId::try_from(row.id)
            .map_err(|_| decode_error(format!("negative user id {}", row.id)))?;
        Ok(Self {
            id,
            name: row.name,
            email: row.email,
            created_at: timestamp("created_at", row.created_at)?,
            updated_at: timestamp("updated_at", row.updated_at)?,
        })
    }
}

fn timestamp(column: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| decode_error(format!("{column} out of range: {millis}")))
}

fn decode_error(message: String) -> Error {
    Error::Query(sqlx::Error::Decode(message.into()))
}
