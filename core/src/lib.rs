//! Synchronous client core for the restaurant-directory service.
//!
//! # Overview
//! Builds the backend's path-segment URLs, performs one blocking GET per
//! operation and interprets the JSON-array answers, collapsing every
//! failure onto the boolean/sentinel contract the mobile caller expects.
//!
//! # Design
//! - `RestoClient` holds only the configured base URL and the blocking
//!   transport; there is no other client-side state.
//! - Each operation is split into a URL builder and a shared interpretation
//!   step, so both halves stay testable without a network.
//! - `try_*` methods keep failure reasons ([`ApiError`]); the plain methods
//!   discard them on purpose — to the app, a dead network and an explicit
//!   refusal look the same.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::RestoClient;
pub use error::ApiError;
pub use types::{Comment, PriceTier, Restaurant};
