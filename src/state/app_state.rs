//! Composition root shared by every consumer of the presentation state

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use super::{ContactCard, Theme, ThemeController, ThemeState, ViewportController, ViewportState};
use crate::{
    pages::Presentation,
    services::{Clipboard, ColorSchemeProbe, PreferenceStore, SubmissionEndpoint},
    tasks::ListenerHandle,
    workflow::ContactFormWorkflow,
};

/// External collaborators the state talks to
pub struct Collaborators {
    pub store: Arc<dyn PreferenceStore>,
    pub color_scheme: Arc<dyn ColorSchemeProbe>,
    pub endpoint: Arc<dyn SubmissionEndpoint>,
    pub clipboard: Arc<dyn Clipboard>,
}

/// Theme and viewport together, as published to views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresentationState {
    pub theme: ThemeState,
    pub viewport: ViewportState,
}

impl PresentationState {
    pub fn presentation(&self) -> Presentation {
        Presentation {
            is_dark: self.theme.is_dark(),
            is_mobile: self.viewport.is_mobile,
        }
    }
}

/// Main application state: one owner for both flags and the contact form
pub struct AppState {
    pub theme: Arc<ThemeController>,
    pub viewport: Arc<ViewportController>,
    pub contact: Arc<ContactFormWorkflow>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    contact_cards: Vec<ContactCard>,
    color_scheme_tx: watch::Sender<Option<Theme>>,
    listeners: Mutex<Vec<ListenerHandle>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("theme", &self.theme)
            .field("viewport", &self.viewport)
            .field("contact", &self.contact)
            .field("port", &self.port)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state and register its listeners; needs a tokio runtime
    pub fn new(port: u16, host: String, initial_width: u32, collaborators: Collaborators) -> Self {
        let Collaborators {
            store,
            color_scheme,
            endpoint,
            clipboard,
        } = collaborators;

        let theme = Arc::new(ThemeController::initialize(store, color_scheme.as_ref()));
        let viewport = Arc::new(ViewportController::new(initial_width));
        let contact = Arc::new(ContactFormWorkflow::new(endpoint, clipboard));

        let (color_scheme_tx, color_scheme_rx) = watch::channel(color_scheme.preferred_theme());
        let listeners = vec![theme.follow_system(color_scheme_rx)];

        Self {
            theme,
            viewport,
            contact,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            contact_cards: Vec::new(),
            color_scheme_tx,
            listeners: Mutex::new(listeners),
        }
    }

    /// Contact details offered for copying next to the form
    pub fn with_contact_cards(mut self, cards: Vec<ContactCard>) -> Self {
        self.contact_cards = cards;
        self
    }

    pub fn contact_cards(&self) -> &[ContactCard] {
        &self.contact_cards
    }

    pub fn presentation(&self) -> PresentationState {
        PresentationState {
            theme: self.theme.current(),
            viewport: self.viewport.current(),
        }
    }

    pub fn toggle_theme(&self) -> PresentationState {
        self.theme.toggle();
        self.record_action("theme-toggle");
        self.presentation()
    }

    /// Apply a viewport resize reported by the front end
    pub fn report_resize(&self, width: u32) -> PresentationState {
        self.viewport.resize(width);
        self.record_action("resize");
        self.presentation()
    }

    /// Forward an OS color-scheme change to the theme listener
    pub fn report_color_scheme(&self, preferred: Option<Theme>) {
        self.color_scheme_tx.send_replace(preferred);
        self.record_action("color-scheme");
    }

    /// Record the name and time of the last state-changing call
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Number of listeners still registered
    pub fn active_listeners(&self) -> usize {
        self.listeners
            .lock()
            .map(|listeners| listeners.iter().filter(|l| l.is_active()).count())
            .unwrap_or(0)
    }

    /// Deregister listeners and tear down the contact form
    pub fn shutdown(&self) -> Result<(), String> {
        let mut listeners = self
            .listeners
            .lock()
            .map_err(|e| format!("Failed to lock listeners: {}", e))?;

        for listener in listeners.drain(..) {
            info!("Stopping {} listener", listener.name());
            listener.deregister();
        }
        drop(listeners);

        self.contact.unmount();
        if self.contact.is_mounted() {
            warn!("Contact form still mounted after shutdown");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        FixedColorScheme, MemoryClipboard, MemoryPreferenceStore, SimulatedEndpoint,
    };
    use crate::state::{ThemeSource, THEME_KEY};
    use std::time::Duration;
    use tokio::time::timeout;

    fn state(store: Arc<MemoryPreferenceStore>, os: Option<Theme>) -> AppState {
        AppState::new(
            0,
            "127.0.0.1".into(),
            1280,
            Collaborators {
                store,
                color_scheme: Arc::new(FixedColorScheme(os)),
                endpoint: Arc::new(SimulatedEndpoint::new()),
                clipboard: Arc::new(MemoryClipboard::new()),
            },
        )
    }

    #[tokio::test]
    async fn flags_change_independently() {
        let app = state(Arc::new(MemoryPreferenceStore::new()), None);
        let before = app.presentation();

        let after_toggle = app.toggle_theme();
        assert_ne!(after_toggle.theme, before.theme);
        assert_eq!(after_toggle.viewport, before.viewport);

        let after_resize = app.report_resize(500);
        assert_eq!(after_resize.theme, after_toggle.theme);
        assert!(after_resize.presentation().is_mobile);
        assert_eq!(app.get_last_action().0.as_deref(), Some("resize"));
    }

    #[tokio::test]
    async fn reported_color_scheme_reaches_theme() {
        let app = state(Arc::new(MemoryPreferenceStore::new()), None);
        let mut rx = app.theme.subscribe();

        app.report_color_scheme(Some(Theme::Light));
        timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("in time")
            .expect("changed");
        assert_eq!(app.theme.current(), ThemeState::new(Theme::Light, ThemeSource::System));
    }

    #[tokio::test]
    async fn stored_theme_ignores_color_scheme_reports() {
        let store = Arc::new(MemoryPreferenceStore::with_entry(THEME_KEY, "dark"));
        let app = state(store, None);

        app.report_color_scheme(Some(Theme::Light));
        tokio::task::yield_now().await;
        assert_eq!(app.theme.current(), ThemeState::new(Theme::Dark, ThemeSource::Stored));
    }

    #[tokio::test]
    async fn shutdown_deregisters_everything() {
        let app = state(Arc::new(MemoryPreferenceStore::new()), None);
        assert_eq!(app.active_listeners(), 1);

        app.shutdown().expect("shutdown");
        assert_eq!(app.active_listeners(), 0);
        assert!(!app.contact.is_mounted());
    }

    #[tokio::test]
    async fn contact_cards_are_kept_in_order() {
        let app = state(Arc::new(MemoryPreferenceStore::new()), None);
        assert!(app.contact_cards().is_empty());

        let app = app.with_contact_cards(vec![
            ContactCard::new("Email", "ada@example.com"),
            ContactCard::new("Location", "London, UK"),
        ]);
        let labels: Vec<_> = app.contact_cards().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Email", "Location"]);
    }
}
