//! Auth gate: exchanges verified credentials for a signed, expiring bearer
//! token and resolves that token back to a user id on protected routes.
//!
//! The token's `sub` is the only authority for "who is acting" — handlers
//! never trust a client-supplied id for protected operations.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Token claims. `sub` is the user id, `exp` a unix timestamp.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

pub struct AuthGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl AuthGate {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::default();
        // Default leeway is 60s; expiry should mean expiry.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Issue a signed token for a user who already proved their credentials.
    pub fn issue(&self, user_id: i64) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Verify signature and expiry. Malformed, tampered and expired tokens
    /// are all the same `Unauthorized` to the caller.
    pub fn authenticate(&self, token: &str) -> Result<i64, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|_| ApiError::Unauthorized)
    }
}

/// Authenticated identity for protected handlers, resolved from the
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub i64);

impl FromRequest for AuthedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthedUser, ApiError> {
    let gate = req
        .app_data::<web::Data<AuthGate>>()
        .ok_or_else(|| ApiError::Internal("auth gate not configured".into()))?;
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header);
    gate.authenticate(token).map(AuthedUser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_authenticate_round_trips_user_id() {
        let gate = AuthGate::new("test-secret", 3600);
        let token = gate.issue(42).unwrap();
        assert_eq!(gate.authenticate(&token).unwrap(), 42);
    }

    #[test]
    fn garbage_token_rejected() {
        let gate = AuthGate::new("test-secret", 3600);
        assert!(gate.authenticate("not.a.token").is_err());
        assert!(gate.authenticate("").is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let issuer = AuthGate::new("secret-a", 3600);
        let verifier = AuthGate::new("secret-b", 3600);
        let token = issuer.issue(1).unwrap();
        assert!(verifier.authenticate(&token).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let gate = AuthGate::new("test-secret", -10);
        let token = gate.issue(1).unwrap();
        assert!(gate.authenticate(&token).is_err());
    }
}
