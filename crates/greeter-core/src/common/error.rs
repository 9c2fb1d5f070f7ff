//! Request-level error types for the greeter service.
//!
//! This module defines the `Error` enum returned by RPC handlers. It implements
//! `From<Error>` for `tonic::Status` so handlers can propagate failures with
//! `?` and clients receive the matching status code.
//!
//! ## Error Cases
//! - `UserNotFound`: The requested user identifier does not resolve.
//! - `Lookup`: Any other failure while resolving the user. Surfaces as
//!   `UNKNOWN`.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified request error for the greeter service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// No user is stored under the requested identifier.
    #[error("user not found")]
    UserNotFound,

    /// The lookup failed for a reason other than a missing row.
    #[error("lookup failed: {context}")]
    Lookup { context: String },
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::UserNotFound => Status::not_found("user not found"),
            Error::Lookup { context } => Status::unknown(context),
        }
    }
}
