//! Error types for the directory API client.
//!
//! # Design
//! The caller boundary never distinguishes "the network is down" from "the
//! server said no" — every operation collapses to a boolean or sentinel.
//! These variants keep the two tiers apart internally so the `try_*`
//! methods can report what actually went wrong, while the boolean wrappers
//! discard the distinction on purpose.

use std::fmt;

/// Errors produced by `RestoClient`'s `try_*` methods.
#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a usable body: DNS, connect, timeout,
    /// a non-success HTTP status, or a failed body read.
    Transport(String),

    /// The body arrived but was not the JSON array every endpoint returns.
    MalformedResponse(String),

    /// A well-formed response that denies the request: conflict rows on a
    /// write, a missing or false confirmation flag, an absent user id.
    Rejected,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport failure: {msg}"),
            ApiError::MalformedResponse(msg) => {
                write!(f, "malformed response: {msg}")
            }
            ApiError::Rejected => write!(f, "request rejected by backend"),
        }
    }
}

impl std::error::Error for ApiError {}
