//! Operating-system color-scheme signal

use crate::state::Theme;

/// Read-only query for the color scheme the OS prefers
pub trait ColorSchemeProbe: Send + Sync {
    fn preferred_theme(&self) -> Option<Theme>;
}

/// Probe answering with a value fixed at startup (from CLI or environment)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedColorScheme(pub Option<Theme>);

impl ColorSchemeProbe for FixedColorScheme {
    fn preferred_theme(&self) -> Option<Theme> {
        self.0
    }
}
