//! Data source client.
//!
//! The roster is built from two unauthenticated JSON documents: the student
//! list and the known-family reference lists. Both are fetched concurrently
//! and joined before any record is built.

pub mod client;
pub mod error;

pub use client::{RosterClient, RosterSources};
pub use error::ApiError;
