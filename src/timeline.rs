//! Timeline aggregation: a user sees their own tweets plus everyone they
//! follow, in append order.

use crate::models::Tweet;
use crate::store::{Store, StoreError};

/// Tweets visible to `user_id`: authored by `user_id` or by anyone in its
/// followee set, ordered by original insertion order. The target user must
/// exist; a user with no follows and no tweets gets an empty vec.
pub fn timeline(store: &dyn Store, user_id: i64) -> Result<Vec<Tweet>, StoreError> {
    if !store.user_exists(user_id)? {
        return Err(StoreError::UnknownUser(user_id));
    }
    let mut visible = store.followees_of(user_id)?;
    // Self is always visible; the graph never auto-inserts a self-edge.
    if !visible.contains(&user_id) {
        visible.push(user_id);
    }
    store.tweets_by_authors(&visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::NewUser;

    fn store_with_users(n: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..n {
            store
                .create_user(NewUser {
                    name: format!("user{i}"),
                    email: format!("user{i}@example.com"),
                    profile: String::new(),
                    hashed_password: "h".into(),
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn fresh_user_has_empty_timeline() {
        let store = store_with_users(1);
        assert!(timeline(&store, 1).unwrap().is_empty());
    }

    #[test]
    fn unknown_user_is_an_error() {
        let store = store_with_users(1);
        assert!(matches!(
            timeline(&store, 42).unwrap_err(),
            StoreError::UnknownUser(42)
        ));
    }

    #[test]
    fn own_tweets_always_visible_without_follows() {
        let store = store_with_users(1);
        store.post_tweet(1, "mine").unwrap();
        let tweets = timeline(&store, 1).unwrap();
        assert_eq!(tweets.len(), 1);
        assert_eq!(tweets[0].tweet, "mine");
    }

    #[test]
    fn follow_makes_followee_posts_visible() {
        let store = store_with_users(2);
        store.follow(1, 2).unwrap();
        store.post_tweet(2, "hello").unwrap();
        let tweets = timeline(&store, 1).unwrap();
        assert_eq!(tweets, vec![Tweet { user_id: 2, tweet: "hello".into() }]);
        // Not symmetric: 2 does not see 1.
        store.post_tweet(1, "reply").unwrap();
        let theirs = timeline(&store, 2).unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].user_id, 2);
    }

    #[test]
    fn unfollow_hides_later_posts_only() {
        let store = store_with_users(2);
        store.follow(1, 2).unwrap();
        store.post_tweet(2, "before").unwrap();
        store.unfollow(1, 2).unwrap();
        store.post_tweet(2, "after").unwrap();
        let tweets = timeline(&store, 1).unwrap();
        // No retroactive removal is expected either way; this store drops
        // everything from an unfollowed author, which is allowed.
        assert!(tweets.iter().all(|t| t.tweet != "after"));
    }

    #[test]
    fn interleaved_authors_keep_append_order() {
        let store = store_with_users(3);
        store.follow(1, 2).unwrap();
        store.follow(1, 3).unwrap();
        store.post_tweet(2, "a").unwrap();
        store.post_tweet(3, "b").unwrap();
        store.post_tweet(1, "c").unwrap();
        store.post_tweet(2, "d").unwrap();
        let bodies: Vec<String> = timeline(&store, 1)
            .unwrap()
            .into_iter()
            .map(|t| t.tweet)
            .collect();
        assert_eq!(bodies, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn self_follow_is_harmless() {
        let store = store_with_users(1);
        store.follow(1, 1).unwrap();
        store.post_tweet(1, "once").unwrap();
        // No duplicate entry even with an explicit self-edge.
        assert_eq!(timeline(&store, 1).unwrap().len(), 1);
    }
}
