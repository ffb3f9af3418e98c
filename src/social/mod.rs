//! Boundary to the external social graph.
//!
//! The engine only needs two read operations: page through the owner's
//! friends, and list a friend's recent casts. `NeynarClient` is the HTTP
//! implementation; tests plug in their own.

pub mod neynar;

pub use neynar::NeynarClient;

use crate::models::{Friend, RawPost};
use std::future::Future;
use thiserror::Error;

/// Errors raised by a social graph collaborator
#[derive(Error, Debug)]
pub enum SocialError {
    /// Missing or invalid credentials / settings
    #[error("Social graph misconfigured: {0}")]
    Config(String),

    /// Non-success HTTP status
    #[error("Social graph returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not finish in time
    #[error("Request timed out")]
    Timeout,

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Result type for social graph operations
pub type SocialResult<T> = Result<T, SocialError>;

/// One page of the owner's friends.
///
/// `next_cursor == None` means there is nothing more to fetch, which is not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendPage {
    pub friends: Vec<Friend>,
    pub next_cursor: Option<String>,
}

/// Read access to the social graph
pub trait SocialGraph: Send + Sync {
    /// Fetch one page of `owner_id`'s friends starting at `cursor`
    fn list_friends(
        &self,
        owner_id: u64,
        cursor: Option<&str>,
        limit: usize,
    ) -> impl Future<Output = SocialResult<FriendPage>> + Send;

    /// Fetch up to `limit` recent casts by `friend_id`
    fn list_posts(
        &self,
        friend_id: u64,
        limit: usize,
    ) -> impl Future<Output = SocialResult<Vec<RawPost>>> + Send;
}
