//! Viewport state and its controller

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::tasks::ListenerHandle;

/// Widths at or below this many logical pixels get the mobile presentation
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Width assumed before the first resize event arrives
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

pub fn is_mobile_width(width: u32) -> bool {
    width <= MOBILE_BREAKPOINT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportState {
    pub width: u32,
    pub is_mobile: bool,
}

impl ViewportState {
    pub fn from_width(width: u32) -> Self {
        Self {
            width,
            is_mobile: is_mobile_width(width),
        }
    }
}

/// Single writer of the viewport flag
#[derive(Debug)]
pub struct ViewportController {
    state_tx: Arc<watch::Sender<ViewportState>>,
}

impl ViewportController {
    pub fn new(initial_width: u32) -> Self {
        let (state_tx, _) = watch::channel(ViewportState::from_width(initial_width));
        Self {
            state_tx: Arc::new(state_tx),
        }
    }

    pub fn current(&self) -> ViewportState {
        *self.state_tx.borrow()
    }

    pub fn is_mobile(&self) -> bool {
        self.current().is_mobile
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewportState> {
        self.state_tx.subscribe()
    }

    /// Apply one resize event
    pub fn resize(&self, width: u32) -> ViewportState {
        apply_resize(&self.state_tx, width)
    }

    /// Register a listener applying every width received on `events`
    pub fn observe(&self, mut events: mpsc::Receiver<u32>) -> ListenerHandle {
        let state_tx = Arc::clone(&self.state_tx);
        let task = tokio::spawn(async move {
            while let Some(width) = events.recv().await {
                apply_resize(&state_tx, width);
            }
            debug!("Resize event source closed");
        });
        ListenerHandle::new("viewport", task)
    }
}

fn apply_resize(state_tx: &watch::Sender<ViewportState>, width: u32) -> ViewportState {
    let next = ViewportState::from_width(width);
    let mut crossed = false;
    state_tx.send_if_modified(|state| {
        if *state == next {
            return false;
        }
        crossed = state.is_mobile != next.is_mobile;
        *state = next;
        true
    });

    if crossed {
        info!("Viewport {}px is now {}", width, if next.is_mobile { "mobile" } else { "desktop" });
    }
    next
}
