//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::state::{ContactCard, Theme, DEFAULT_VIEWPORT_WIDTH};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Headless presentation state and contact workflow for a personal portfolio")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554", env = "FOLIO_PORT")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "FOLIO_HOST")]
    pub host: String,

    /// File holding persisted preferences (the theme choice)
    #[arg(long, default_value = "folio-prefs.json", env = "FOLIO_PREFS")]
    pub prefs: PathBuf,

    /// Color scheme reported by the operating system, if any
    #[arg(long, value_enum, env = "FOLIO_COLOR_SCHEME")]
    pub color_scheme: Option<Theme>,

    /// Form-submission endpoint receiving contact messages
    #[arg(long, env = "FOLIO_FORM_ENDPOINT", conflicts_with = "formspree_id")]
    pub form_endpoint: Option<String>,

    /// Formspree form id, expanded to https://formspree.io/f/<id>
    #[arg(long, env = "FOLIO_FORMSPREE_ID")]
    pub formspree_id: Option<String>,

    /// Timeout for a single submission request in seconds
    #[arg(long, default_value = "15", env = "FOLIO_SUBMIT_TIMEOUT")]
    pub submit_timeout: u64,

    /// Email address shown on the contact page
    #[arg(long, env = "FOLIO_CONTACT_EMAIL")]
    pub contact_email: Option<String>,

    /// Phone number shown on the contact page
    #[arg(long, env = "FOLIO_CONTACT_PHONE")]
    pub contact_phone: Option<String>,

    /// Phone number as copied to the clipboard, defaults to the shown number
    #[arg(long, env = "FOLIO_CONTACT_PHONE_COPY", requires = "contact_phone")]
    pub contact_phone_copy: Option<String>,

    /// Location shown on the contact page
    #[arg(long, env = "FOLIO_CONTACT_LOCATION")]
    pub contact_location: Option<String>,

    /// Viewport width assumed before the first resize event
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    pub viewport_width: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve the submission endpoint URL, `None` selects the simulated fallback
    pub fn submission_url(&self) -> Option<String> {
        if let Some(url) = self.form_endpoint.as_deref().map(str::trim) {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }

        self.formspree_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://formspree.io/f/{}", id))
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout)
    }

    /// Contact cards for the configured details, in display order
    pub fn contact_cards(&self) -> Vec<ContactCard> {
        let mut cards = Vec::new();
        if let Some(email) = non_blank(self.contact_email.as_deref()) {
            cards.push(ContactCard::new("Email", email));
        }
        if let Some(phone) = non_blank(self.contact_phone.as_deref()) {
            let card = ContactCard::new("Phone", phone);
            cards.push(match non_blank(self.contact_phone_copy.as_deref()) {
                Some(copy) => card.with_copy_text(copy),
                None => card,
            });
        }
        if let Some(location) = non_blank(self.contact_location.as_deref()) {
            cards.push(ContactCard::new("Location", location));
        }
        cards
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
