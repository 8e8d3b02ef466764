//! Folio - presentation state and contact workflow for a personal portfolio
//!
//! This library owns the two flags every portfolio view renders from (the
//! dark-mode theme and the mobile viewport), and the contact form's
//! validate-submit-notify workflow. The binary exposes both over HTTP.

pub mod api;
pub mod config;
pub mod pages;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
pub use workflow::ContactFormWorkflow;
