//! # Shared Greeter Types
//!
//! Types and helpers shared by the server and by clients of the `Greeter`
//! service, so both sides agree on identifier width and greeting format.

use crate::Error;

/// Primary key of a stored user.
///
/// The wire format carries identifiers as `int64`; the store generates them as
/// positive integers.
pub type UserId = u64;

/// Converts a wire identifier into a [`UserId`]. A negative identifier can
/// never resolve to a stored user and reports [`Error::UserNotFound`].
pub fn user_id_from_wire(raw: i64) -> Result<UserId, Error> {
    UserId::try_from(raw).map_err(|_| Error::UserNotFound)
}

/// Converts a [`UserId`] into its wire representation.
///
/// Identifiers above `i64::MAX` cannot be produced by any supported store and
/// saturate.
pub fn user_id_to_wire(id: UserId) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

/// Formats the greeting returned by `SayHello`.
pub fn greeting(name: &str) -> String {
    format!("Hello, {name}!")
}
