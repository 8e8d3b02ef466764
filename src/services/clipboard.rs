//! Clipboard collaborator

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard access was denied")]
    Denied,
    #[error("clipboard is unavailable")]
    Unavailable,
}

/// Best-effort text clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard holding the last copied text in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    denied: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write, like a browser without permission
    pub fn denied() -> Self {
        Self {
            contents: Mutex::new(None),
            denied: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.denied {
            return Err(ClipboardError::Denied);
        }
        let mut contents = self.contents.lock().map_err(|_| ClipboardError::Unavailable)?;
        *contents = Some(text.to_string());
        Ok(())
    }
}
