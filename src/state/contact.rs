//! Contact form data, validation rules and submission status

use std::{collections::BTreeMap, fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME_ERROR: &str = "Please enter your full name";
pub const EMAIL_ERROR: &str = "Valid email required";
pub const MESSAGE_ERROR: &str = "Message should be at least 10 characters";

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;

/// Per-field validation messages, empty when the form is valid
pub type ValidationErrors = BTreeMap<Field, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown contact field: {}", s))
    }
}

/// What the visitor typed; also the JSON body sent to the form endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

impl ContactFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_empty())
    }

    /// Check every field at once; subject is optional and never fails
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            errors.insert(Field::Name, NAME_ERROR.to_string());
        }
        if self.email.trim().is_empty() || !email_pattern().is_match(&self.email) {
            errors.insert(Field::Email, EMAIL_ERROR.to_string());
        }
        if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            errors.insert(Field::Message, MESSAGE_ERROR.to_string());
        }

        errors
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Sending => "sending",
            SubmissionStatus::Success => "success",
            SubmissionStatus::Error => "error",
        }
    }
}

/// Status plus the message shown next to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotice {
    pub status: SubmissionStatus,
    pub message: String,
}

impl StatusNotice {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn sending(message: impl Into<String>) -> Self {
        Self::with(SubmissionStatus::Sending, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with(SubmissionStatus::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with(SubmissionStatus::Error, message)
    }

    pub fn is_idle(&self) -> bool {
        self.status == SubmissionStatus::Idle
    }

    fn with(status: SubmissionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// A contact detail shown beside the form
///
/// `copy_text` is what a copy puts on the clipboard; it can differ from the
/// displayed `value` (a phone number in local format, for example).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCard {
    pub label: String,
    pub value: String,
    pub copy_text: String,
}

impl ContactCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: label.into(),
            copy_text: value.clone(),
            value,
        }
    }

    pub fn with_copy_text(mut self, copy_text: impl Into<String>) -> Self {
        self.copy_text = copy_text.into();
        self
    }
}
