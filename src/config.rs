//! Process-wide configuration, read from the environment once at startup.
//! Everything has a development default; `MINITWEET_SECRET` should be set
//! for any real deployment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Path to the SQLite database file.
    pub database_path: String,
    /// HMAC secret for signing access tokens. Loaded once, never mutated.
    pub token_secret: String,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            bind_addr: env_or("MINITWEET_BIND", "127.0.0.1:8080"),
            database_path: env_or("MINITWEET_DB", "minitweet.db"),
            token_secret: env_or("MINITWEET_SECRET", "dev-secret-change-me"),
            token_ttl_secs: env_or("MINITWEET_TOKEN_TTL", "86400")
                .parse()
                .unwrap_or(86_400),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
