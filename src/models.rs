use serde::{Deserialize, Serialize};

/// Hard ceiling on tweet body length. Longer bodies are rejected, never truncated.
pub const MAX_TWEET_CHARS: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub user_id: i64,
    pub tweet: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct TweetRequest {
    pub tweet: String,
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub follow: i64,
}

#[derive(Debug, Deserialize)]
pub struct UnfollowRequest {
    pub unfollow: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub user_id: i64,
    pub timeline: Vec<Tweet>,
}
