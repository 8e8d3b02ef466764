//! Contact form workflow: edit, validate, submit, report

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    services::{Clipboard, SubmissionEndpoint},
    state::{ContactFields, Field, StatusNotice, SubmissionStatus, ValidationErrors},
    tasks::TransientStatus,
};

/// How long a submission result stays on screen
pub const SUBMISSION_NOTICE_LIFETIME: Duration = Duration::from_millis(3500);
/// How long a clipboard result stays on screen
pub const CLIPBOARD_NOTICE_LIFETIME: Duration = Duration::from_millis(1500);

pub const SENDING_MESSAGE: &str = "Sending your message...";
pub const DELIVERED_MESSAGE: &str = "Thanks! I'll get back to you shortly.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";
pub const COPIED_MESSAGE: &str = "Copied to clipboard";
pub const COPY_FAILED_MESSAGE: &str = "Copy failed";

/// Result of one submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The endpoint accepted the message and the form was cleared
    Delivered,
    /// Nothing was sent; the errors are stored per field
    Invalid(ValidationErrors),
    /// Another submission is in flight
    AlreadySending,
    /// Delivery failed; the form keeps what the visitor typed
    Failed(String),
    /// The form was torn down before or during the attempt
    Detached,
}

/// Result of one clipboard copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
    /// The form was torn down; nothing was shown
    Detached,
}

/// Everything a view needs to render the contact page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSnapshot {
    pub fields: ContactFields,
    pub errors: ValidationErrors,
    pub status: StatusNotice,
    pub clipboard: StatusNotice,
    pub can_submit: bool,
}

#[derive(Debug, Default)]
struct FormState {
    fields: ContactFields,
    errors: ValidationErrors,
    detached: bool,
}

/// One mounted contact form
pub struct ContactFormWorkflow {
    form: Mutex<FormState>,
    submission: TransientStatus,
    clipboard_notice: TransientStatus,
    endpoint: Arc<dyn SubmissionEndpoint>,
    clipboard: Arc<dyn Clipboard>,
}

impl fmt::Debug for ContactFormWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactFormWorkflow")
            .field("form", &self.form)
            .field("submission", &self.submission)
            .field("clipboard_notice", &self.clipboard_notice)
            .finish_non_exhaustive()
    }
}

impl ContactFormWorkflow {
    pub fn new(endpoint: Arc<dyn SubmissionEndpoint>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            form: Mutex::new(FormState::default()),
            submission: TransientStatus::new("submission"),
            clipboard_notice: TransientStatus::new("clipboard"),
            endpoint,
            clipboard,
        }
    }

    fn lock_form(&self) -> MutexGuard<'_, FormState> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set one field and drop only that field's error
    pub fn update_field(&self, field: Field, value: impl Into<String>) {
        let mut form = self.lock_form();
        if form.detached {
            return;
        }
        form.fields.set(field, value);
        form.errors.remove(&field);
    }

    pub fn fields(&self) -> ContactFields {
        self.lock_form().fields.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        self.lock_form().errors.clone()
    }

    /// Validate the current fields without touching stored errors
    pub fn validate(&self) -> ValidationErrors {
        self.lock_form().fields.validate()
    }

    pub fn status(&self) -> StatusNotice {
        self.submission.current()
    }

    pub fn clipboard_status(&self) -> StatusNotice {
        self.clipboard_notice.current()
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusNotice> {
        self.submission.subscribe()
    }

    pub fn subscribe_clipboard(&self) -> broadcast::Receiver<StatusNotice> {
        self.clipboard_notice.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        !self.lock_form().detached
    }

    pub fn uses_simulated_endpoint(&self) -> bool {
        self.endpoint.is_simulated()
    }

    pub fn snapshot(&self) -> ContactSnapshot {
        let (fields, errors) = {
            let form = self.lock_form();
            (form.fields.clone(), form.errors.clone())
        };
        let status = self.submission.current();
        ContactSnapshot {
            fields,
            errors,
            can_submit: status.status != SubmissionStatus::Sending,
            status,
            clipboard: self.clipboard_notice.current(),
        }
    }

    /// Validate and deliver the message
    ///
    /// The status goes `Sending` then `Success` or `Error`, and back to
    /// `Idle` after [`SUBMISSION_NOTICE_LIFETIME`]. Invalid forms never leave
    /// `Idle`.
    pub async fn submit(&self) -> SubmitOutcome {
        if !self.is_mounted() {
            return SubmitOutcome::Detached;
        }
        if self.submission.current().status == SubmissionStatus::Sending {
            debug!("Submit ignored, a message is already being sent");
            return SubmitOutcome::AlreadySending;
        }

        let fields = {
            let mut form = self.lock_form();
            if form.detached {
                return SubmitOutcome::Detached;
            }
            let errors = form.fields.validate();
            if !errors.is_empty() {
                info!("Contact form has {} invalid field(s), not sending", errors.len());
                form.errors = errors.clone();
                return SubmitOutcome::Invalid(errors);
            }
            form.errors.clear();
            form.fields.clone()
        };

        if !self.submission.begin(StatusNotice::sending(SENDING_MESSAGE)) {
            return if self.submission.is_closed() {
                SubmitOutcome::Detached
            } else {
                SubmitOutcome::AlreadySending
            };
        }

        info!("Sending contact message from {}", fields.email);
        let result = self.endpoint.deliver(&fields).await;

        match result {
            Ok(()) => {
                {
                    let mut form = self.lock_form();
                    if form.detached {
                        debug!("Contact form torn down before delivery finished");
                        return SubmitOutcome::Detached;
                    }
                    form.fields.clear();
                }
                self.submission
                    .show(StatusNotice::success(DELIVERED_MESSAGE), SUBMISSION_NOTICE_LIFETIME);
                info!("Contact message delivered");
                SubmitOutcome::Delivered
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.trim().is_empty() {
                    message = GENERIC_FAILURE_MESSAGE.to_string();
                }
                warn!("Contact message delivery failed: {}", message);

                if !self
                    .submission
                    .show(StatusNotice::error(message.clone()), SUBMISSION_NOTICE_LIFETIME)
                {
                    return SubmitOutcome::Detached;
                }
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Copy `text` and report the result on the clipboard notice
    pub async fn copy_to_clipboard(&self, text: &str) -> CopyOutcome {
        if !self.is_mounted() {
            debug!("Copy ignored, contact form is unmounted");
            return CopyOutcome::Detached;
        }

        let result = self.clipboard.write_text(text).await;

        let (notice, outcome) = match result {
            Ok(()) => (StatusNotice::success(COPIED_MESSAGE), CopyOutcome::Copied),
            Err(e) => {
                debug!("Clipboard write failed: {}", e);
                (StatusNotice::error(COPY_FAILED_MESSAGE), CopyOutcome::Failed)
            }
        };

        if !self.clipboard_notice.show(notice, CLIPBOARD_NOTICE_LIFETIME) {
            return CopyOutcome::Detached;
        }
        outcome
    }

    /// Tear the form down: cancel timers and ignore every later update
    pub fn unmount(&self) {
        self.lock_form().detached = true;
        self.submission.close();
        self.clipboard_notice.close();
        debug!("Contact form unmounted");
    }
}

impl Drop for ContactFormWorkflow {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{HttpFormEndpoint, MemoryClipboard, SimulatedEndpoint};
    use tokio::net::TcpListener;
    use tokio::time::{advance, Instant};

    fn workflow(endpoint: SimulatedEndpoint) -> Arc<ContactFormWorkflow> {
        Arc::new(ContactFormWorkflow::new(
            Arc::new(endpoint),
            Arc::new(MemoryClipboard::new()),
        ))
    }

    fn fill_valid(form: &ContactFormWorkflow) {
        form.update_field(Field::Name, "Ada Lovelace");
        form.update_field(Field::Email, "ada@example.com");
        form.update_field(Field::Subject, "Engines");
        form.update_field(Field::Message, "I would like to talk about engines.");
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_form_stays_idle_and_reports_per_field() {
        let form = workflow(SimulatedEndpoint::new());
        let mut rx = form.subscribe_status();
        form.update_field(Field::Name, "Al");
        form.update_field(Field::Email, "bad");
        form.update_field(Field::Message, "short");

        let SubmitOutcome::Invalid(errors) = form.submit().await else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![Field::Email, Field::Message]);
        assert_eq!(form.errors(), errors);
        assert_eq!(form.validate(), errors);
        assert!(form.status().is_idle());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn editing_a_field_clears_only_its_error() {
        let form = workflow(SimulatedEndpoint::new());
        form.submit().await;
        assert_eq!(form.errors().len(), 3);

        form.update_field(Field::Email, "still bad");
        let errors = form.errors();
        assert!(!errors.contains_key(&Field::Email));
        assert!(errors.contains_key(&Field::Name));
        assert!(errors.contains_key(&Field::Message));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_success_clears_fields_and_reverts() {
        let form = workflow(SimulatedEndpoint::new());
        let mut rx = form.subscribe_status();
        fill_valid(&form);

        assert_eq!(form.submit().await, SubmitOutcome::Delivered);
        assert_eq!(rx.recv().await.expect("sending").status, SubmissionStatus::Sending);
        assert_eq!(rx.recv().await.expect("success"), StatusNotice::success(DELIVERED_MESSAGE));
        assert!(form.fields().is_empty());
        assert_eq!(form.fields(), ContactFields::default());

        let shown_at = Instant::now();
        assert_eq!(rx.recv().await.expect("idle"), StatusNotice::idle());
        assert!(shown_at.elapsed() >= SUBMISSION_NOTICE_LIFETIME);
        assert!(form.status().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_delivery_keeps_fields_and_reverts() {
        let form = workflow(SimulatedEndpoint::failing("Service offline"));
        let mut rx = form.subscribe_status();
        fill_valid(&form);
        let typed = form.fields();

        assert_eq!(form.submit().await, SubmitOutcome::Failed("Service offline".into()));
        assert_eq!(rx.recv().await.expect("sending").status, SubmissionStatus::Sending);
        assert_eq!(rx.recv().await.expect("error"), StatusNotice::error("Service offline"));
        assert_eq!(form.fields(), typed);

        assert_eq!(rx.recv().await.expect("idle"), StatusNotice::idle());
        assert_eq!(form.fields(), typed);
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_while_sending_is_rejected() {
        let form = workflow(SimulatedEndpoint::new().with_delay(Duration::from_secs(30)));
        fill_valid(&form);

        let first = tokio::spawn({
            let form = Arc::clone(&form);
            async move { form.submit().await }
        });
        while form.status().status != SubmissionStatus::Sending {
            tokio::task::yield_now().await;
        }

        let before = form.snapshot();
        assert!(!before.can_submit);
        assert_eq!(form.submit().await, SubmitOutcome::AlreadySending);
        assert_eq!(form.snapshot(), before);

        assert_eq!(first.await.expect("join"), SubmitOutcome::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn clipboard_notices_are_short_and_independent() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let form = Arc::new(ContactFormWorkflow::new(
            Arc::new(SimulatedEndpoint::new()),
            Arc::clone(&clipboard) as Arc<dyn Clipboard>,
        ));
        fill_valid(&form);
        let mut clip_rx = form.subscribe_clipboard();

        let sending = tokio::spawn({
            let form = Arc::clone(&form);
            async move { form.submit().await }
        });
        while form.status().status != SubmissionStatus::Sending {
            tokio::task::yield_now().await;
        }

        let start = Instant::now();
        assert_eq!(form.copy_to_clipboard("ada@example.com").await, CopyOutcome::Copied);
        assert_eq!(clipboard.contents().as_deref(), Some("ada@example.com"));
        assert_eq!(clip_rx.recv().await.expect("copied"), StatusNotice::success(COPIED_MESSAGE));
        assert_eq!(form.status().status, SubmissionStatus::Sending);

        assert_eq!(clip_rx.recv().await.expect("idle"), StatusNotice::idle());
        assert!(start.elapsed() >= CLIPBOARD_NOTICE_LIFETIME);
        assert!(start.elapsed() < SUBMISSION_NOTICE_LIFETIME);

        assert_eq!(sending.await.expect("join"), SubmitOutcome::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_clipboard_reports_failure_then_reverts() {
        let clipboard = Arc::new(MemoryClipboard::denied());
        let form = ContactFormWorkflow::new(
            Arc::new(SimulatedEndpoint::new()),
            Arc::clone(&clipboard) as Arc<dyn Clipboard>,
        );
        let mut rx = form.subscribe_clipboard();

        assert_eq!(form.copy_to_clipboard("+1 555 0100").await, CopyOutcome::Failed);
        assert_eq!(clipboard.contents(), None);
        assert_eq!(rx.recv().await.expect("error"), StatusNotice::error(COPY_FAILED_MESSAGE));
        assert_eq!(rx.recv().await.expect("idle"), StatusNotice::idle());
        assert!(form.clipboard_status().is_idle());
        assert!(form.status().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_mid_request_ignores_the_result() {
        let form = workflow(SimulatedEndpoint::new());
        fill_valid(&form);
        let typed = form.fields();

        let pending = tokio::spawn({
            let form = Arc::clone(&form);
            async move { form.submit().await }
        });
        while form.status().status != SubmissionStatus::Sending {
            tokio::task::yield_now().await;
        }
        form.unmount();

        assert_eq!(pending.await.expect("join"), SubmitOutcome::Detached);
        assert_eq!(form.fields(), typed);
        assert_eq!(form.status().status, SubmissionStatus::Sending);

        advance(SUBMISSION_NOTICE_LIFETIME * 2).await;
        assert_eq!(form.status().status, SubmissionStatus::Sending);
        assert_eq!(form.submit().await, SubmitOutcome::Detached);
    }

    #[tokio::test(start_paused = true)]
    async fn copy_after_teardown_is_detached() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let form = ContactFormWorkflow::new(
            Arc::new(SimulatedEndpoint::new()),
            Arc::clone(&clipboard) as Arc<dyn Clipboard>,
        );
        let mut rx = form.subscribe_clipboard();
        form.unmount();

        assert_eq!(form.copy_to_clipboard("ada@example.com").await, CopyOutcome::Detached);
        assert_eq!(clipboard.contents(), None);
        assert!(form.clipboard_status().is_idle());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_error_and_keeps_fields() {
        // Bind then drop so nothing is listening on the port
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            listener.local_addr().expect("addr")
        };
        let url = format!("http://{}/f/test", addr);
        let endpoint = HttpFormEndpoint::new(url, Duration::from_secs(2)).expect("client");
        let form = ContactFormWorkflow::new(Arc::new(endpoint), Arc::new(MemoryClipboard::new()));
        let mut rx = form.subscribe_status();
        fill_valid(&form);
        let typed = form.fields();

        let SubmitOutcome::Failed(message) = form.submit().await else {
            panic!("expected a delivery failure");
        };
        assert_eq!(message, "Could not reach the form service. Please try again later.");
        assert_eq!(rx.recv().await.expect("sending").status, SubmissionStatus::Sending);
        assert_eq!(rx.recv().await.expect("error"), StatusNotice::error(message));
        assert_eq!(form.fields(), typed);
        assert!(form.snapshot().can_submit);

        assert_eq!(rx.recv().await.expect("idle"), StatusNotice::idle());
        assert_eq!(form.fields(), typed);
    }
}
