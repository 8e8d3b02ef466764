//! User-facing workflows built on the state and service layers

pub mod contact_form;

pub use contact_form::{
    ContactFormWorkflow, ContactSnapshot, CopyOutcome, SubmitOutcome, CLIPBOARD_NOTICE_LIFETIME,
    SUBMISSION_NOTICE_LIFETIME,
};
