use axum::{routing::get, Json, Router};
use tracing::{debug, instrument};

use super::dto::DepartmentInfo;
use crate::{auth::extractors::AuthUser, state::AppState};

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/json", get(department_info))
        .route("/personal-profile", get(personal_profile))
}

#[instrument]
pub async fn department_info(user: AuthUser) -> Json<DepartmentInfo> {
    debug!(username = %user.username, "department info");
    Json(DepartmentInfo {
        college: "Sece".into(),
        dept: "CYS".into(),
        stu_count: "64".into(),
        fac: user.username,
    })
}

#[instrument]
pub async fn personal_profile(user: AuthUser) -> String {
    format!("Welcome, {}", user.username)
}
