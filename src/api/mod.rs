//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/presentation", get(presentation_handler))
        .route("/api/theme/toggle", post(toggle_theme_handler))
        .route("/api/viewport", post(viewport_handler))
        .route("/api/color-scheme", post(color_scheme_handler))
        .route("/api/pages", get(navigation_handler))
        .route("/api/pages/:page", get(page_handler))
        .route("/api/contact", get(contact_handler))
        .route("/api/contact/fields/:field", put(update_field_handler))
        .route("/api/contact/submit", post(submit_handler))
        .route("/api/clipboard", post(clipboard_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
