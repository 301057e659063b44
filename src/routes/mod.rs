use axum::{Router, routing::post};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod doc;
pub mod doctor;
pub mod health;
pub mod params;
pub mod patient;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .nest("/patient", patient::router())
        .nest("/doctor", doctor::router())
        .nest("/admin", admin::router())
}
