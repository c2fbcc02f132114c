// src/error.rs
use std::fmt;
use warp::reject::Reject;

/// Rejection carried out of a handler when an account store operation fails.
/// The request fails at the HTTP level; nothing is spoken to the caller.
#[derive(Debug)]
pub struct StoreFailure {
    pub operation: &'static str,
    pub message: String,
}

impl fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account store {} failed: {}", self.operation, self.message)
    }
}

impl std::error::Error for StoreFailure {}

impl Reject for StoreFailure {}
