//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{ContactCard, PresentationState, Theme, ThemeSource, ValidationErrors},
    workflow::ContactSnapshot,
};

/// Current presentation flags
#[derive(Debug, Clone, Serialize)]
pub struct PresentationResponse {
    pub theme: Theme,
    pub theme_source: ThemeSource,
    pub is_dark: bool,
    pub root_marker: String,
    pub width: u32,
    pub is_mobile: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<PresentationState> for PresentationResponse {
    fn from(state: PresentationState) -> Self {
        Self {
            theme: state.theme.theme,
            theme_source: state.theme.source,
            is_dark: state.theme.is_dark(),
            root_marker: state.theme.root_marker().to_string(),
            width: state.viewport.width,
            is_mobile: state.viewport.is_mobile,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResizeRequest {
    pub width: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorSchemeRequest {
    pub preferred: Option<Theme>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdateRequest {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClipboardRequest {
    pub text: String,
}

/// Response for contact form actions
#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub outcome: String,
    pub message: String,
    #[serde(skip_serializing_if = "ValidationErrors::is_empty")]
    pub errors: ValidationErrors,
    pub form: ContactSnapshot,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<ContactCard>,
    pub timestamp: DateTime<Utc>,
}

impl ContactResponse {
    pub fn new(outcome: &str, message: impl Into<String>, form: ContactSnapshot) -> Self {
        Self {
            outcome: outcome.to_string(),
            message: message.into(),
            errors: ValidationErrors::new(),
            form,
            cards: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_cards(mut self, cards: &[ContactCard]) -> Self {
        self.cards = cards.to_vec();
        self
    }

    pub fn with_errors(mut self, errors: ValidationErrors) -> Self {
        self.errors = errors;
        self
    }
}

/// Server status with uptime and last action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub delivery: String,
    pub listeners: usize,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
