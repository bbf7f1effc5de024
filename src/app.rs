use std::net::SocketAddr;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, profile};

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(|| async { "Server started successfully" }))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(profile::router())
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

/// Origins are validated by `AppConfig::from_env`; anything unparsable is skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::ORIGIN, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use time::{Duration as TimeDuration, OffsetDateTime};
    use tower::ServiceExt;

    const ORIGINS: [&str; 1] = ["http://localhost:3000"];

    fn test_app() -> (Router, AppState) {
        let state = AppState::fake();
        let origins: Vec<String> = ORIGINS.iter().map(|o| o.to_string()).collect();
        (build_app(state.clone(), &origins), state)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = send(app, req).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().uri(uri);
        if let Some(t) = token {
            builder = builder.header(AUTHORIZATION, t);
        }
        send(app, builder.body(Body::empty()).unwrap()).await
    }

    async fn signup_and_login(app: &Router) -> String {
        let (status, _) = post_json(
            app,
            "/signup",
            json!({"email": "a@x.com", "username": "a", "password": "p1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) =
            post_json(app, "/login", json!({"email": "a@x.com", "password": "p1"})).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token").to_string()
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let (app, _) = test_app();
        let (status, body) = get_with_token(&app, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Server started successfully");

        let (status, body) = get_with_token(&app, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn signup_login_and_profile_flow() {
        let (app, _) = test_app();

        let (status, body) = post_json(
            &app,
            "/signup",
            json!({"email": "a@x.com", "username": "a", "password": "p1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Signup Successful", "isSignup": true}));

        let (status, body) =
            post_json(&app, "/login", json!({"email": "a@x.com", "password": "p1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login Successful");
        assert_eq!(body["isLoggedIn"], true);
        let token = body["token"].as_str().unwrap();

        let (status, body) = get_with_token(&app, "/personal-profile", Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Welcome, a");

        let (status, body) = get_with_token(&app, "/json", Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({"College": "Sece", "Dept": "CYS", "StuCount": "64", "fac": "a"})
        );
    }

    #[tokio::test]
    async fn signup_failures_carry_flag_and_message() {
        let (app, _) = test_app();

        let (status, body) =
            post_json(&app, "/signup", json!({"email": "a@x.com", "password": "p1"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "All fields are required", "isSignup": false}));

        signup_and_login(&app).await;
        let (status, body) = post_json(
            &app,
            "/signup",
            json!({"email": "a@x.com", "username": "b", "password": "p2"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Email already exists", "isSignup": false}));
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_failure() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/signup")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, bytes) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["isSignup"], false);
    }

    #[tokio::test]
    async fn login_failures_map_to_status_codes() {
        let (app, _) = test_app();
        signup_and_login(&app).await;

        let (status, body) =
            post_json(&app, "/login", json!({"email": "ghost@x.com", "password": "p1"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"message": "User not found. Please sign up first.", "isLoggedIn": false})
        );

        let (status, body) =
            post_json(&app, "/login", json!({"email": "a@x.com", "password": "wrong"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Incorrect password", "isLoggedIn": false}));

        let (status, body) = post_json(&app, "/login", json!({"email": "a@x.com"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["isLoggedIn"], false);
    }

    #[tokio::test]
    async fn gate_rejects_missing_and_invalid_tokens() {
        let (app, state) = test_app();
        let valid = signup_and_login(&app).await;

        let (status, body) = get_with_token(&app, "/personal-profile", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"message": "No token provided"}));

        let (status, _) = get_with_token(&app, "/json", Some("")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = get_with_token(&app, "/json", Some("garbage")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"message": "Invalid or expired token"}));

        let expired = state
            .keys
            .sign_at("a@x.com", "a", OffsetDateTime::now_utc() - TimeDuration::hours(2))
            .unwrap();
        let (status, _) = get_with_token(&app, "/personal-profile", Some(&expired)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // The header is the raw token; a scheme prefix makes it unverifiable.
        let prefixed = format!("Bearer {valid}");
        let (status, _) = get_with_token(&app, "/personal-profile", Some(&prefixed)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn listing_omits_password_hash() {
        let (app, _) = test_app();
        signup_and_login(&app).await;

        let (status, bytes) = get_with_token(&app, "/getallsignup", None).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], "a@x.com");
        assert_eq!(users[0]["username"], "a");
        assert!(users[0].get("passwordHash").is_none());
        assert!(users[0].get("password_hash").is_none());
        assert!(!String::from_utf8_lossy(&bytes).contains("argon2"));
    }

    #[tokio::test]
    async fn cors_preflight_honours_allow_list() {
        let (app, _) = test_app();
        let preflight = |origin: &str| {
            Request::builder()
                .method("OPTIONS")
                .uri("/login")
                .header(ORIGIN, origin)
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap()
        };

        let res = app.clone().oneshot(preflight("http://localhost:3000")).await.unwrap();
        assert_eq!(
            res.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            res.headers().get("access-control-allow-credentials").unwrap(),
            "true"
        );

        let res = app.oneshot(preflight("http://evil.test")).await.unwrap();
        assert!(res.headers().get("access-control-allow-origin").is_none());
    }
}
