//! Durable state behind a single trait: user records, the follow graph, and
//! the append-only tweet log. Handlers and the timeline aggregator only see
//! `Store`; the sqlite implementation backs the server and the in-memory one
//! backs tests.

pub mod memory;
pub mod sqlite;

use thiserror::Error;

use crate::models::{Tweet, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid user id {0}")]
    UnknownUser(i64),
    #[error("invalid follower id {0}")]
    UnknownFollower(i64),
    #[error("invalid followee id {0}")]
    UnknownFollowee(i64),
    #[error("tweet is {0} characters, limit is 300")]
    TweetTooLong(usize),
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// New-user fields as they arrive at the store. The password is already
/// hashed; the store never sees a raw password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub profile: String,
    pub hashed_password: String,
}

pub trait Store: Send + Sync {
    /// Insert a user and return it with its assigned id.
    /// Fails with `DuplicateEmail` if the email is already registered.
    fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    fn user_exists(&self, user_id: i64) -> Result<bool, StoreError>;

    /// Look up `(id, hashed_password)` for login. `None` when the email is
    /// unknown; the caller collapses that into the same error as a bad
    /// password.
    fn credential_by_email(&self, email: &str) -> Result<Option<(i64, String)>, StoreError>;

    /// Add a follow edge. Re-following an existing edge is a no-op.
    /// Both sides must name existing users.
    fn follow(&self, follower_id: i64, followee_id: i64) -> Result<(), StoreError>;

    /// Remove a follow edge. Idempotent: removing an edge that was never
    /// there succeeds without changing anything. Both ids are still
    /// validated against the user table.
    fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<(), StoreError>;

    /// Users that `user_id` follows. Never includes `user_id` itself unless
    /// a self-follow edge was explicitly created.
    fn followees_of(&self, user_id: i64) -> Result<Vec<i64>, StoreError>;

    /// Append a tweet. Rejects bodies over `MAX_TWEET_CHARS` characters and
    /// unknown authors.
    fn post_tweet(&self, author_id: i64, body: &str) -> Result<(), StoreError>;

    /// All tweets by any of the given authors, in append order.
    fn tweets_by_authors(&self, author_ids: &[i64]) -> Result<Vec<Tweet>, StoreError>;
}
