pub mod controller;

pub use controller::{StatusOnEdit, SubmissionController, SubmitOutcome};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const SUCCESS_NOTICE: &str = "Message sent successfully!";
pub const ERROR_NOTICE: &str = "Failed to send message. Please try again.";

// ── Payload ───────────────────────────────────────────

/// What the visitor typed. Only non-emptiness is checked, the email is not pattern matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl SubmissionPayload {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        SubmissionPayload {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Message => self.message = value,
        }
    }

    /// Required fields that are currently empty, in form order.
    pub fn empty_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.empty_fields().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "message" => Ok(Field::Message),
            other => Err(format!("unknown form field: {}", other)),
        }
    }
}

// ── Status ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Success | SubmissionStatus::Error)
    }
}

// ── View ──────────────────────────────────────────────

/// Everything the presentation layer needs to draw the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub fields: SubmissionPayload,
    pub status: SubmissionStatus,
    pub can_submit: bool,
    pub notice: Option<&'static str>,
}

impl FormView {
    pub fn new(fields: SubmissionPayload, status: SubmissionStatus) -> Self {
        let can_submit = status != SubmissionStatus::Sending && fields.is_complete();
        let notice = match status {
            SubmissionStatus::Success => Some(SUCCESS_NOTICE),
            SubmissionStatus::Error => Some(ERROR_NOTICE),
            _ => None,
        };
        FormView {
            fields,
            status,
            can_submit,
            notice,
        }
    }
}
