//! SQLite-backed store. A pooled connection per call; every operation is a
//! single statement, so per-statement atomicity is all the isolation needed.

use log::debug;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use super::{NewUser, Store, StoreError};
use crate::models::{Tweet, User, MAX_TWEET_CHARS};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    profile         TEXT NOT NULL,
    hashed_password TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS tweets (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    tweet   TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS users_follow_list (
    user_id        INTEGER NOT NULL REFERENCES users(id),
    follow_user_id INTEGER NOT NULL REFERENCES users(id),
    PRIMARY KEY (user_id, follow_user_id)
);
";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Self::with_manager(SqliteConnectionManager::file(path))
    }

    /// Fresh in-memory database, one shared connection so all pool checkouts
    /// see the same data.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let store = SqliteStore { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn with_manager(manager: SqliteConnectionManager) -> Result<Self, StoreError> {
        let pool = Pool::new(manager).map_err(|e| StoreError::Backend(e.to_string()))?;
        let store = SqliteStore { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn exists(conn: &rusqlite::Connection, user_id: i64) -> Result<bool, StoreError> {
        let found: Option<i64> = conn
            .query_row("SELECT id FROM users WHERE id = ?1", params![user_id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn check_edge_users(
        conn: &rusqlite::Connection,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<(), StoreError> {
        if !Self::exists(conn, follower_id)? {
            return Err(StoreError::UnknownFollower(follower_id));
        }
        if !Self::exists(conn, followee_id)? {
            return Err(StoreError::UnknownFollowee(followee_id));
        }
        Ok(())
    }
}

impl Store for SqliteStore {
    fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let conn = self.pool.get()?;
        let result = conn.execute(
            "INSERT INTO users (name, email, profile, hashed_password) VALUES (?1, ?2, ?3, ?4)",
            params![
                new_user.name,
                new_user.email,
                new_user.profile,
                new_user.hashed_password
            ],
        );
        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                name: new_user.name,
                email: new_user.email,
                profile: new_user.profile,
                hashed_password: new_user.hashed_password,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        Self::exists(&conn, user_id)
    }

    fn credential_by_email(&self, email: &str) -> Result<Option<(i64, String)>, StoreError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT id, hashed_password FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    fn follow(&self, follower_id: i64, followee_id: i64) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        Self::check_edge_users(&conn, follower_id, followee_id)?;
        conn.execute(
            "INSERT OR IGNORE INTO users_follow_list (user_id, follow_user_id) VALUES (?1, ?2)",
            params![follower_id, followee_id],
        )?;
        Ok(())
    }

    fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        Self::check_edge_users(&conn, follower_id, followee_id)?;
        conn.execute(
            "DELETE FROM users_follow_list WHERE user_id = ?1 AND follow_user_id = ?2",
            params![follower_id, followee_id],
        )?;
        Ok(())
    }

    fn followees_of(&self, user_id: i64) -> Result<Vec<i64>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT follow_user_id FROM users_follow_list WHERE user_id = ?1")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn post_tweet(&self, author_id: i64, body: &str) -> Result<(), StoreError> {
        let chars = body.chars().count();
        if chars > MAX_TWEET_CHARS {
            return Err(StoreError::TweetTooLong(chars));
        }
        let conn = self.pool.get()?;
        if !Self::exists(&conn, author_id)? {
            return Err(StoreError::UnknownUser(author_id));
        }
        conn.execute(
            "INSERT INTO tweets (user_id, tweet) VALUES (?1, ?2)",
            params![author_id, body],
        )?;
        Ok(())
    }

    fn tweets_by_authors(&self, author_ids: &[i64]) -> Result<Vec<Tweet>, StoreError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.pool.get()?;
        // rusqlite has no array binding, so build the placeholder list.
        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let sql = format!(
            "SELECT user_id, tweet FROM tweets WHERE user_id IN ({placeholders}) ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let tweets = stmt
            .query_map(rusqlite::params_from_iter(author_ids.iter()), |row| {
                Ok(Tweet {
                    user_id: row.get(0)?,
                    tweet: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<Tweet>, _>>()?;
        debug!("fetched {} tweets for {} authors", tweets.len(), author_ids.len());
        Ok(tweets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_users(n: usize) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for i in 0..n {
            store
                .create_user(NewUser {
                    name: format!("user{i}"),
                    email: format!("user{i}@example.com"),
                    profile: String::new(),
                    hashed_password: "hash".into(),
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn user_ids_start_at_one() {
        let store = store_with_users(2);
        assert!(store.user_exists(1).unwrap());
        assert!(store.user_exists(2).unwrap());
        assert!(!store.user_exists(3).unwrap());
    }

    #[test]
    fn duplicate_email_rejected() {
        let store = store_with_users(1);
        let err = store
            .create_user(NewUser {
                name: "other".into(),
                email: "user0@example.com".into(),
                profile: String::new(),
                hashed_password: "hash".into(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn credential_lookup() {
        let store = store_with_users(1);
        let (id, hash) = store
            .credential_by_email("user0@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(hash, "hash");
        assert!(store.credential_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn follow_edges_validated_per_side() {
        let store = store_with_users(2);
        assert!(matches!(
            store.follow(9, 1).unwrap_err(),
            StoreError::UnknownFollower(9)
        ));
        assert!(matches!(
            store.follow(1, 9).unwrap_err(),
            StoreError::UnknownFollowee(9)
        ));
        store.follow(1, 2).unwrap();
        // Re-follow is a no-op, not an error or a second edge.
        store.follow(1, 2).unwrap();
        assert_eq!(store.followees_of(1).unwrap(), vec![2]);
    }

    #[test]
    fn unfollow_is_idempotent() {
        let store = store_with_users(2);
        store.unfollow(1, 2).unwrap();
        store.follow(1, 2).unwrap();
        store.unfollow(1, 2).unwrap();
        store.unfollow(1, 2).unwrap();
        assert!(store.followees_of(1).unwrap().is_empty());
    }

    #[test]
    fn tweet_length_ceiling() {
        let store = store_with_users(1);
        store.post_tweet(1, &"a".repeat(300)).unwrap();
        let err = store.post_tweet(1, &"a".repeat(301)).unwrap_err();
        assert!(matches!(err, StoreError::TweetTooLong(301)));
        // Character count, not byte count.
        store.post_tweet(1, &"ö".repeat(300)).unwrap();
    }

    #[test]
    fn tweets_come_back_in_append_order() {
        let store = store_with_users(2);
        store.post_tweet(1, "first").unwrap();
        store.post_tweet(2, "second").unwrap();
        store.post_tweet(1, "third").unwrap();
        let tweets = store.tweets_by_authors(&[1, 2]).unwrap();
        let bodies: Vec<&str> = tweets.iter().map(|t| t.tweet.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    #[test]
    fn unknown_author_rejected() {
        let store = store_with_users(1);
        assert!(matches!(
            store.post_tweet(5, "hi").unwrap_err(),
            StoreError::UnknownUser(5)
        ));
    }
}
