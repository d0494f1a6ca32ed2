//! JWT token generation and validation.
//!
//! Access and refresh tokens share one HS256 secret and differ by their
//! `kind` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Claims, TokenKind, TokenPair};
use crate::config::JwtConfig;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// A refresh token was presented where an access token is expected, or
    /// the other way round.
    #[error("wrong token type")]
    WrongKind,

    /// Token is invalid.
    #[error("invalid token")]
    Invalid,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry_secs", &self.config.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.config.refresh_token_expiry_secs)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn sign(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        role: &str,
        kind: TokenKind,
    ) -> Result<String, JwtError> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_token_expiry_secs,
            TokenKind::Refresh => self.config.refresh_token_expiry_secs,
        };
        let claims = Claims::new(
            user_id,
            tenant_id,
            role,
            kind,
            Utc::now() + Duration::seconds(ttl),
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Issues an access/refresh token pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        role: &str,
    ) -> Result<TokenPair, JwtError> {
        let access = self.sign(user_id, tenant_id, role, TokenKind::Access)?;
        let refresh = self.sign(user_id, tenant_id, role, TokenKind::Refresh)?;
        Ok(TokenPair::new(
            access,
            refresh,
            self.config.access_token_expiry_secs,
        ))
    }

    /// Validates a token and checks that it is of the expected kind.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::WrongKind` on a kind mismatch, and
    /// `JwtError::DecodingError` if the token is malformed.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::Invalid,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        if claims.kind != expected {
            return Err(JwtError::WrongKind);
        }
        Ok(claims)
    }
}
