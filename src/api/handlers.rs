//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    pages::{navigation, render_page, NavEntry, PageView, Route},
    state::{AppState, Field},
    workflow::{CopyOutcome, SubmitOutcome},
};

use super::responses::{
    ClipboardRequest, ColorSchemeRequest, ContactResponse, FieldUpdateRequest, HealthResponse,
    PresentationResponse, ResizeRequest, StatusResponse,
};

/// Handle GET /api/presentation - Current theme and viewport flags
pub async fn presentation_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PresentationResponse> {
    Json(state.presentation().into())
}

/// Handle POST /api/theme/toggle - Flip the theme and persist it
pub async fn toggle_theme_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PresentationResponse> {
    let presentation = state.toggle_theme();
    info!("Theme toggle endpoint called - theme now {}", presentation.theme.theme);
    Json(presentation.into())
}

/// Handle POST /api/viewport - Apply a resize event
pub async fn viewport_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResizeRequest>,
) -> Json<PresentationResponse> {
    Json(state.report_resize(request.width).into())
}

/// Handle POST /api/color-scheme - Report an OS color-scheme change
pub async fn color_scheme_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ColorSchemeRequest>,
) -> StatusCode {
    state.report_color_scheme(request.preferred);
    StatusCode::ACCEPTED
}

/// Handle GET /api/pages - Navigation entries
pub async fn navigation_handler() -> Json<Vec<NavEntry>> {
    Json(navigation())
}

/// Handle GET /api/pages/:page - Render one page for the current flags
pub async fn page_handler(
    State(state): State<Arc<AppState>>,
    Path(page): Path<String>,
) -> Result<Json<PageView>, StatusCode> {
    let route: Route = page.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })?;
    let presentation = state.presentation().presentation();
    Ok(Json(render_page(route, presentation)))
}

/// Handle GET /api/contact - Contact form snapshot and contact cards
pub async fn contact_handler(State(state): State<Arc<AppState>>) -> Json<ContactResponse> {
    let snapshot = state.contact.snapshot();
    let message = snapshot.status.message.clone();
    let outcome = snapshot.status.status.as_str();
    Json(ContactResponse::new(outcome, message, snapshot).with_cards(state.contact_cards()))
}

/// Handle PUT /api/contact/fields/:field - Update one form field
pub async fn update_field_handler(
    State(state): State<Arc<AppState>>,
    Path(field): Path<String>,
    Json(request): Json<FieldUpdateRequest>,
) -> Result<Json<ContactResponse>, StatusCode> {
    let field: Field = field.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })?;

    if !state.contact.is_mounted() {
        return Err(StatusCode::GONE);
    }
    state.contact.update_field(field, request.value);
    let message = format!("{} updated", field);
    Ok(Json(ContactResponse::new("updated", message, state.contact.snapshot())))
}

/// Handle POST /api/contact/submit - Validate and send the message
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ContactResponse>) {
    let outcome = state.contact.submit().await;
    state.record_action("contact-submit");
    let snapshot = state.contact.snapshot();

    let (code, response) = match outcome {
        SubmitOutcome::Delivered => {
            info!("Submit endpoint called - message delivered");
            let message = snapshot.status.message.clone();
            (StatusCode::OK, ContactResponse::new("delivered", message, snapshot))
        }
        SubmitOutcome::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ContactResponse::new("invalid", "Please fix the highlighted fields", snapshot)
                .with_errors(errors),
        ),
        SubmitOutcome::AlreadySending => (
            StatusCode::CONFLICT,
            ContactResponse::new("sending", "A message is already being sent", snapshot),
        ),
        SubmitOutcome::Failed(message) => {
            warn!("Submit endpoint called - delivery failed: {}", message);
            (StatusCode::BAD_GATEWAY, ContactResponse::new("failed", message, snapshot))
        }
        SubmitOutcome::Detached => (
            StatusCode::GONE,
            ContactResponse::new("detached", "The contact form is no longer active", snapshot),
        ),
    };
    (code, Json(response))
}

/// Handle POST /api/clipboard - Copy contact details
pub async fn clipboard_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClipboardRequest>,
) -> (StatusCode, Json<ContactResponse>) {
    let outcome = state.contact.copy_to_clipboard(&request.text).await;
    let snapshot = state.contact.snapshot();
    let message = snapshot.clipboard.message.clone();

    let (code, response) = match outcome {
        CopyOutcome::Copied => (StatusCode::OK, ContactResponse::new("copied", message, snapshot)),
        CopyOutcome::Failed => (
            StatusCode::SERVICE_UNAVAILABLE,
            ContactResponse::new("copy-failed", message, snapshot),
        ),
        CopyOutcome::Detached => (
            StatusCode::GONE,
            ContactResponse::new("detached", "The contact form is no longer active", snapshot),
        ),
    };
    (code, Json(response))
}

/// Handle GET /status - Return server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();
    let delivery = if state.contact.uses_simulated_endpoint() {
        "simulated"
    } else {
        "http"
    };

    Json(StatusResponse {
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        delivery: delivery.to_string(),
        listeners: state.active_listeners(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
