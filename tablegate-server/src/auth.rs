//! Session tokens and the bearer extractor.

use crate::error::ServerError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tablegate_core::{Principal, SessionError, SessionVerifier};

/// The legacy `role` claim: one role or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Accepted from older tokens, never issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
    /// Issued at (Unix timestamp).
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn new(principal: &Principal, expiry: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: principal.username().to_string(),
            roles: principal.roles().to_vec(),
            role: None,
            iat: now,
            exp: now.saturating_add(expiry.as_secs() as i64),
        }
    }

    /// `roles` followed by the legacy `role` claim.
    pub fn into_principal(self) -> Principal {
        let legacy = match self.role {
            Some(RoleClaim::One(role)) => vec![role],
            Some(RoleClaim::Many(roles)) => roles,
            None => Vec::new(),
        };
        Principal::new(self.sub, self.roles.into_iter().chain(legacy))
    }
}

/// A freshly issued session token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Issues and verifies HS256 session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], expiry: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            expiry,
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Sign a token for `principal`.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let claims = Claims::new(principal, self.expiry);
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken {
            access_token,
            token_type: "bearer",
            expires_in: self.expiry.as_secs(),
        })
    }
}

impl SessionVerifier for TokenService {
    fn verify(&self, token: &str) -> Result<Principal, SessionError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                ErrorKind::InvalidSignature => SessionError::InvalidSignature,
                _ => SessionError::Malformed(e.to_string()),
            }
        })?;
        Ok(data.claims.into_principal())
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn parse_bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The principal behind the request's bearer token.
///
/// Rejects with 401 when the header is missing or the token does not verify.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServerError::Unauthorized("missing bearer token".to_string()))?;
        let token = parse_bearer_token(value)
            .ok_or_else(|| ServerError::Unauthorized("missing bearer token".to_string()))?;

        state
            .tokens
            .verify(token)
            .map(CurrentUser)
            .map_err(|e| {
                log::debug!("rejected session token: {}", e);
                ServerError::Unauthorized(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::from_secs(600))
    }

    fn sign(claims: &Claims, secret: &[u8]) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let alice = Principal::new("alice", ["writer", "reader"]);

        let issued = tokens.issue(&alice).unwrap();
        assert_eq!(issued.token_type, "bearer");
        assert_eq!(issued.expires_in, 600);

        let principal = tokens.verify(&issued.access_token).unwrap();
        assert_eq!(principal, alice);
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".into(),
            roles: vec!["reader".into()],
            role: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = sign(&claims, b"test-secret");
        assert_eq!(service().verify(&token), Err(SessionError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let alice = Principal::new("alice", ["reader"]);
        let claims = Claims::new(&alice, Duration::from_secs(600));
        let token = sign(&claims, b"other-secret");
        assert_eq!(service().verify(&token), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            service().verify("not-a-jwt"),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn test_legacy_role_claim() {
        let now = Utc::now().timestamp();
        let single = serde_json::json!({
            "sub": "writer_user", "role": "writer", "iat": now, "exp": now + 60
        });
        let token = encode(
            &Header::default(),
            &single,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        let principal = service().verify(&token).unwrap();
        assert_eq!(principal.roles(), &["writer".to_string()]);

        let list = serde_json::json!({
            "sub": "admin_user", "role": ["admin", "reader"], "iat": now, "exp": now + 60
        });
        let token = encode(
            &Header::default(),
            &list,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        let principal = service().verify(&token).unwrap();
        assert_eq!(principal.primary_role(), Some("admin"));
        assert_eq!(principal.roles().len(), 2);
    }

    #[test]
    fn test_token_without_expiry_is_malformed() {
        let claims = serde_json::json!({"sub": "alice", "roles": ["reader"]});
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(
            service().verify(&token),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_bearer_token() {
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("Bearer "), None);
        assert_eq!(parse_bearer_token("Basic abc"), None);
        assert_eq!(parse_bearer_token("abc"), None);
    }
}
