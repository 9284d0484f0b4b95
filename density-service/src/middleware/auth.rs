use crate::startup::AppState;
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};
use service_core::error::AppError;

/// Subject id resolved from the `Authorization: Bearer` header by the configured
/// [`IdentityVerifier`](crate::services::IdentityVerifier).
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject(pub String);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedSubject
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or malformed bearer token"))
        })?;

        let state = AppState::from_ref(state);
        let subject_id = state.verifier.verify(token).await.map_err(|e| {
            tracing::warn!(error = %e, "Rejected bearer token");
            e
        })?;

        tracing::Span::current().record("subject_id", subject_id.as_str());

        Ok(AuthenticatedSubject(subject_id))
    }
}
