//! Registration handle for background listeners

use tokio::task::JoinHandle;
use tracing::debug;

/// Owns a spawned listener task and deregisters it when dropped
#[derive(Debug)]
pub struct ListenerHandle {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub fn new(name: &'static str, task: JoinHandle<()>) -> Self {
        Self {
            name,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the listener is still receiving events
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the listener now
    pub fn deregister(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Deregistered {} listener", self.name);
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
