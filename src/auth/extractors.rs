use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{error::AuthError, jwt::JwtKeys};

/// Identity of the caller, recomputed from the token on every request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The header carries the raw token, no "Bearer " scheme.
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(v) if !v.is_empty() => v,
            _ => return Err(AuthError::MissingToken),
        };
        let token = header.to_str().map_err(|_| AuthError::InvalidToken)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            email: claims.email,
            username: claims.username,
        })
    }
}
