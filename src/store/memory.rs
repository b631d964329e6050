//! In-memory store used by tests. Same contract as the sqlite store, held in
//! a mutex since nothing here outlives a single test process.

use std::collections::BTreeSet;
use std::sync::Mutex;

use super::{NewUser, Store, StoreError};
use crate::models::{Tweet, User, MAX_TWEET_CHARS};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tweets: Vec<Tweet>,
    // (follower, followee), ordered so tests can assert on edges directly.
    follows: BTreeSet<(i64, i64)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl Inner {
    fn has_user(&self, user_id: i64) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    fn check_edge_users(&self, follower_id: i64, followee_id: i64) -> Result<(), StoreError> {
        if !self.has_user(follower_id) {
            return Err(StoreError::UnknownFollower(follower_id));
        }
        if !self.has_user(followee_id) {
            return Err(StoreError::UnknownFollowee(followee_id));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: inner.users.len() as i64 + 1,
            name: new_user.name,
            email: new_user.email,
            profile: new_user.profile,
            hashed_password: new_user.hashed_password,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.lock()?.has_user(user_id))
    }

    fn credential_by_email(&self, email: &str) -> Result<Option<(i64, String)>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| (u.id, u.hashed_password.clone())))
    }

    fn follow(&self, follower_id: i64, followee_id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_edge_users(follower_id, followee_id)?;
        inner.follows.insert((follower_id, followee_id));
        Ok(())
    }

    fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_edge_users(follower_id, followee_id)?;
        inner.follows.remove(&(follower_id, followee_id));
        Ok(())
    }

    fn followees_of(&self, user_id: i64) -> Result<Vec<i64>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followee)| *followee)
            .collect())
    }

    fn post_tweet(&self, author_id: i64, body: &str) -> Result<(), StoreError> {
        let chars = body.chars().count();
        if chars > MAX_TWEET_CHARS {
            return Err(StoreError::TweetTooLong(chars));
        }
        let mut inner = self.lock()?;
        if !inner.has_user(author_id) {
            return Err(StoreError::UnknownUser(author_id));
        }
        inner.tweets.push(Tweet {
            user_id: author_id,
            tweet: body.to_string(),
        });
        Ok(())
    }

    fn tweets_by_authors(&self, author_ids: &[i64]) -> Result<Vec<Tweet>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .tweets
            .iter()
            .filter(|t| author_ids.contains(&t.user_id))
            .cloned()
            .collect())
    }
}
