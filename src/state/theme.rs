//! Theme state and its controller

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    services::{ColorSchemeProbe, PreferenceStore},
    tasks::ListenerHandle,
};

/// Storage key of the persisted theme preference
pub const THEME_KEY: &str = "theme";

/// Theme used when neither storage nor the OS has an opinion
pub const DEFAULT_THEME: Theme = Theme::Dark;

/// Color scheme of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    /// Persisted form, also used as the root document's theme class
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current theme value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSource {
    /// Read from persisted storage at startup
    Stored,
    /// Reported by the operating system
    System,
    /// Nothing known, fixed default
    Default,
    /// Chosen by the user in this session
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    pub theme: Theme,
    pub source: ThemeSource,
}

impl ThemeState {
    pub fn new(theme: Theme, source: ThemeSource) -> Self {
        Self { theme, source }
    }

    pub fn is_dark(&self) -> bool {
        self.theme.is_dark()
    }

    /// Marker set on the root document for CSS scoping
    pub fn root_marker(&self) -> &'static str {
        self.theme.as_str()
    }

    fn follows_system(&self) -> bool {
        matches!(self.source, ThemeSource::System | ThemeSource::Default)
    }
}

/// Single writer of the theme flag
pub struct ThemeController {
    store: Arc<dyn PreferenceStore>,
    state_tx: Arc<watch::Sender<ThemeState>>,
    // Keeps flip and persist of one toggle together
    toggle_lock: Mutex<()>,
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("state", &*self.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl ThemeController {
    /// Resolve the initial theme: storage first, then the OS, then the default
    pub fn initialize(store: Arc<dyn PreferenceStore>, probe: &dyn ColorSchemeProbe) -> Self {
        let stored = match store.load(THEME_KEY) {
            Ok(Some(value)) => {
                let theme = Theme::parse(&value);
                if theme.is_none() {
                    warn!("Ignoring unrecognised stored theme {:?}", value);
                }
                theme
            }
            Ok(None) => None,
            Err(e) => {
                debug!("Theme storage unavailable, falling back to system preference: {}", e);
                None
            }
        };

        let initial = stored
            .map(|theme| ThemeState::new(theme, ThemeSource::Stored))
            .or_else(|| {
                probe
                    .preferred_theme()
                    .map(|theme| ThemeState::new(theme, ThemeSource::System))
            })
            .unwrap_or(ThemeState::new(DEFAULT_THEME, ThemeSource::Default));

        info!("Theme initialized to {} ({:?})", initial.theme, initial.source);

        let (state_tx, _) = watch::channel(initial);
        Self {
            store,
            state_tx: Arc::new(state_tx),
            toggle_lock: Mutex::new(()),
        }
    }

    pub fn current(&self) -> ThemeState {
        *self.state_tx.borrow()
    }

    pub fn is_dark(&self) -> bool {
        self.current().is_dark()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.state_tx.subscribe()
    }

    /// Flip the theme, persist it and notify subscribers
    pub fn toggle(&self) -> ThemeState {
        let _guard = self.toggle_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.state_tx.send_modify(|state| {
            state.theme = state.theme.toggled();
            state.source = ThemeSource::User;
        });
        let state = self.current();

        if let Err(e) = self.store.save(THEME_KEY, state.theme.as_str()) {
            warn!("Failed to persist theme preference: {}", e);
        }

        info!("Theme toggled to {}", state.theme);
        state
    }

    /// Follow OS color-scheme changes until the user picks a theme
    ///
    /// Changes are ignored once the value came from storage or a toggle.
    pub fn follow_system(&self, mut changes: watch::Receiver<Option<Theme>>) -> ListenerHandle {
        let state_tx = Arc::clone(&self.state_tx);
        let task = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(preferred) = *changes.borrow_and_update() else {
                    continue;
                };

                let applied = state_tx.send_if_modified(|state| {
                    if !state.follows_system() || state.theme == preferred {
                        return false;
                    }
                    *state = ThemeState::new(preferred, ThemeSource::System);
                    true
                });

                if applied {
                    info!("Theme follows system preference: {}", preferred);
                } else {
                    debug!("System preference {} not applied", preferred);
                }
            }
        });
        ListenerHandle::new("color-scheme", task)
    }
}
