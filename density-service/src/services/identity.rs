use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::collections::HashMap;

/// Resolves a bearer token to the id of the subject it was issued to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AppError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verifies HS256 tokens signed with a shared secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<String, AppError> {
        let data = decode::<SubjectClaims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Invalid token payload"
            )));
        }
        Ok(data.claims.sub)
    }
}

/// Fixed token table for local development and tests.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new<I, T, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(t, s)| (t.into(), s.into()))
                .collect(),
        }
    }

    /// Parses `token:subject` pairs separated by commas. Malformed entries are skipped.
    pub fn from_pairs(pairs: &str) -> Self {
        Self::new(pairs.split(',').filter_map(|entry| {
            let (token, subject) = entry.trim().split_once(':')?;
            let (token, subject) = (token.trim(), subject.trim());
            (!token.is_empty() && !subject.is_empty()).then(|| (token, subject))
        }))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AppError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid token")))
    }
}

/// Rejects every token. Used when no verifier is configured.
pub struct DenyAllVerifier;

#[async_trait]
impl IdentityVerifier for DenyAllVerifier {
    async fn verify(&self, _token: &str) -> Result<String, AppError> {
        Err(AppError::Unauthorized(anyhow::anyhow!(
            "Authentication is not configured"
        )))
    }
}
