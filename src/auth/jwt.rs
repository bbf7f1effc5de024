use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::state::AppState;

/// Lifetime of a session token. There is no refresh and no revocation.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// HS256 signing and verification keys derived from the server secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, email: &str, username: &str) -> anyhow::Result<String> {
        self.sign_at(email, username, OffsetDateTime::now_utc())
    }

    pub(crate) fn sign_at(
        &self,
        email: &str,
        username: &str,
        issued_at: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = issued_at + TimeDuration::seconds(TOKEN_TTL.as_secs() as i64);
        let claims = Claims {
            email: email.to_string(),
            username: username.to_string(),
            iat: issued_at.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(email = %email, "jwt signed");
        Ok(token)
    }

    /// Checks signature and expiry; nothing else is consulted. No clock
    /// leeway: a token is dead the second `exp` passes.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(email = %data.claims.email, "jwt verified");
        Ok(data.claims)
    }
}
