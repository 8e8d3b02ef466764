//! State management module
//!
//! This module contains the presentation flags (theme and viewport), the
//! contact form data types and the composition root that owns them.

pub mod app_state;
pub mod contact;
pub mod theme;
pub mod viewport;

// Re-export main types
pub use app_state::{AppState, Collaborators, PresentationState};
pub use contact::{
    ContactCard, ContactFields, Field, StatusNotice, SubmissionStatus, ValidationErrors,
};
pub use theme::{Theme, ThemeController, ThemeSource, ThemeState, DEFAULT_THEME, THEME_KEY};
pub use viewport::{
    is_mobile_width, ViewportController, ViewportState, DEFAULT_VIEWPORT_WIDTH, MOBILE_BREAKPOINT,
};
