use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_SUBJECT: &str = "No subject";

/// Contact form body as submitted by the browser. Every field is optional at
/// the wire level; required fields are enforced by [`build_submission`].
#[derive(Debug, Default, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Stored contact record. Never mutated or deleted by this service; the
/// store assigns its identity on insert.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub submitted_at: String,
    pub origin_address: String,
    pub client_agent: String,
}

/// Validates the payload and assembles the record to store. Checks name,
/// email and message in that order and fails on the first missing or empty
/// one, before anything is written.
pub fn build_submission(
    payload: ContactPayload,
    submitted_at: String,
    origin_address: String,
    client_agent: String,
) -> Result<ContactSubmission, AppError> {
    let name = require_field("name", payload.name)?;
    let email = require_field("email", payload.email)?;
    let message = require_field("message", payload.message)?;

    Ok(ContactSubmission {
        name,
        email,
        subject: payload
            .subject
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        message,
        submitted_at,
        origin_address,
        client_agent,
    })
}

fn require_field(field: &'static str, value: Option<String>) -> Result<String, AppError> {
    value.filter(|value| !value.is_empty()).ok_or_else(|| {
        AppError::bad_request("missing_field", format!("Missing required field: {field}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(payload: ContactPayload) -> Result<ContactSubmission, AppError> {
        build_submission(
            payload,
            "2026-08-04T12:00:00.000Z".to_string(),
            "203.0.113.9".to_string(),
            "test-agent".to_string(),
        )
    }

    fn message_of(err: AppError) -> String {
        match err {
            AppError::BadRequest { message, .. } => message,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn all_fields_missing_names_name_first() {
        let err = build(ContactPayload::default()).expect_err("expected validation failure");
        assert_eq!(message_of(err), "Missing required field: name");
    }

    #[test]
    fn empty_email_is_rejected() {
        let err = build(ContactPayload {
            name: Some("Ada".to_string()),
            email: Some(String::new()),
            subject: None,
            message: Some("Hello".to_string()),
        })
        .expect_err("expected validation failure");
        assert_eq!(message_of(err), "Missing required field: email");
    }

    #[test]
    fn missing_message_is_rejected() {
        let err = build(ContactPayload {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            subject: Some("Hi".to_string()),
            message: None,
        })
        .expect_err("expected validation failure");
        assert_eq!(message_of(err), "Missing required field: message");
    }

    #[test]
    fn subject_defaults_only_when_absent() {
        let submission = build(ContactPayload {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            subject: None,
            message: Some("Hello".to_string()),
        })
        .expect("submission should build");
        assert_eq!(submission.subject, DEFAULT_SUBJECT);

        let submission = build(ContactPayload {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            subject: Some(String::new()),
            message: Some("Hello".to_string()),
        })
        .expect("submission should build");
        assert_eq!(submission.subject, "");
    }

    #[test]
    fn complete_payload_builds_record() {
        let submission = build(ContactPayload {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            subject: Some("Role inquiry".to_string()),
            message: Some("Are you available?".to_string()),
        })
        .expect("submission should build");

        assert_eq!(submission.name, "Ada");
        assert_eq!(submission.email, "ada@example.com");
        assert_eq!(submission.subject, "Role inquiry");
        assert_eq!(submission.message, "Are you available?");
        assert_eq!(submission.submitted_at, "2026-08-04T12:00:00.000Z");
        assert_eq!(submission.origin_address, "203.0.113.9");
        assert_eq!(submission.client_agent, "test-agent");
    }
}
