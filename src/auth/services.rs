use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{LoginRequest, PublicUser, SignupRequest},
    error::{AuthError, AuthResult},
    jwt::JwtKeys,
    password::{hash_password_blocking, verify_password_blocking},
    repo::UserStore,
    repo_types::{NewUser, User},
};

/// Absent and empty both count as missing.
fn required(field: Option<String>) -> AuthResult<String> {
    field.filter(|v| !v.is_empty()).ok_or(AuthError::Validation)
}

/// Registers a new account. Does not issue a token; the caller logs in separately.
///
/// The existence check is only a fast path. Two concurrent signups for the same
/// email can both pass it; the store's unique constraint decides, and the loser
/// gets [`AuthError::DuplicateEmail`] from the insert.
#[instrument(skip_all)]
pub async fn signup(store: &dyn UserStore, req: SignupRequest) -> AuthResult<User> {
    let email = required(req.email)?;
    let username = required(req.username)?;
    let password = required(req.password)?;

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AuthError::DuplicateEmail);
    }

    let password_hash = hash_password_blocking(password).await?;

    let user = store
        .insert(NewUser {
            email: &email,
            username: &username,
            password_hash: &password_hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, username = %user.username, "user registered");
    Ok(user)
}

/// Checks credentials and mints a session token for `{email, username}`.
#[instrument(skip_all)]
pub async fn login(store: &dyn UserStore, keys: &JwtKeys, req: LoginRequest) -> AuthResult<String> {
    let email = required(req.email)?;
    let password = required(req.password)?;

    let user = match store.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::UserNotFound);
        }
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = keys.sign(&user.email, &user.username)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(token)
}

pub async fn list_users(store: &dyn UserStore) -> AuthResult<Vec<PublicUser>> {
    let users = store.list().await?;
    Ok(users
        .into_iter()
        .map(|u| PublicUser {
            id: u.id,
            email: u.email,
            username: u.username,
            created_at: u.created_at,
        })
        .collect())
}
