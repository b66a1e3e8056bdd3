use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, admin, auth, home, profile};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::root))
        .route("/home", get(home::home_page))
        .route("/home/search", post(home::search))
        .route("/home/language", post(home::set_language))
        .route("/home/feedback/positive", post(home::positive_feedback))
        .route("/home/feedback/negative", post(home::negative_feedback))
        .route(
            "/home/feedback/negative/open",
            post(home::open_negative_feedback),
        )
        .route(
            "/home/feedback/negative/cancel",
            post(home::cancel_negative_feedback),
        )
        .route("/home/save", post(home::toggle_save))
        .route("/login", get(auth::login_page).post(auth::process_login))
        .route("/signup", get(auth::signup_page).post(auth::process_signup))
        .route("/logout", post(auth::logout))
        .route("/profile", get(profile::profile_page))
        .route("/admin", get(admin::dashboard))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
