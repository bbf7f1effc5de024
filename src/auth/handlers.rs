use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, PublicUser, SignupRequest, SignupResponse},
        error::AuthError,
        services,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn listing_routes() -> Router<AppState> {
    Router::new().route("/getallsignup", get(list_signups))
}

type Failure<T> = (StatusCode, Json<T>);

fn signup_failure(err: AuthError) -> Failure<SignupResponse> {
    err.log();
    let message = match err {
        AuthError::StoreFailure(_) => "Signup failed. Please try again.",
        ref e => e.public_message(),
    };
    (
        err.status_code(),
        Json(SignupResponse {
            message: message.into(),
            is_signup: false,
        }),
    )
}

fn login_failure(err: AuthError) -> Failure<LoginResponse> {
    err.log();
    let message = match err {
        AuthError::StoreFailure(_) => "Login failed. Please try again.",
        ref e => e.public_message(),
    };
    (
        err.status_code(),
        Json(LoginResponse {
            message: message.into(),
            is_logged_in: false,
            token: None,
        }),
    )
}

/// A body that is not JSON at all is treated like one with no fields.
fn body_or_validation<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!(error = %e, "unreadable request body");
        AuthError::Validation
    })
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, Failure<SignupResponse>> {
    let req = body_or_validation(payload).map_err(signup_failure)?;
    services::signup(state.store.as_ref(), req)
        .await
        .map_err(signup_failure)?;

    Ok(Json(SignupResponse {
        message: "Signup Successful".into(),
        is_signup: true,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, Failure<LoginResponse>> {
    let req = body_or_validation(payload).map_err(login_failure)?;
    let token = services::login(state.store.as_ref(), &state.keys, req)
        .await
        .map_err(login_failure)?;

    Ok(Json(LoginResponse {
        message: "Login Successful".into(),
        is_logged_in: true,
        token: Some(token),
    }))
}

// Unauthenticated, like the service it replaces; hashes are stripped.
#[instrument(skip(state))]
pub async fn list_signups(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, Failure<MessageResponse>> {
    let users = services::list_users(state.store.as_ref()).await.map_err(|e| {
        e.log();
        (
            e.status_code(),
            Json(MessageResponse {
                message: "Error fetching data".into(),
            }),
        )
    })?;
    Ok(Json(users))
}
