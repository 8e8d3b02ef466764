//! External collaborator module
//!
//! This module contains the boundaries the presentation state talks to:
//! preference storage, the OS color-scheme signal, the form-submission
//! endpoint and the clipboard.

pub mod clipboard;
pub mod color_scheme;
pub mod storage;
pub mod submission;

// Re-export main types
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use color_scheme::{ColorSchemeProbe, FixedColorScheme};
pub use storage::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, StorageError};
pub use submission::{HttpFormEndpoint, SimulatedEndpoint, SubmissionEndpoint, SubmissionError};
