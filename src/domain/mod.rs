//! Domain records and shaping rules for the CV site API
//!
//! Provides the contact submission and analytics event models, their
//! validation and defaulting rules, and the stats projection.

pub mod analytics;
pub mod contact;
pub mod stats;

use chrono::{SecondsFormat, Utc};

pub const CONTACTS_COLLECTION: &str = "contacts";
pub const ANALYTICS_COLLECTION: &str = "analytics";

/// Field the stats query orders contact submissions by.
pub const SUBMITTED_AT_FIELD: &str = "submitted_at";

/// Current time as a fixed-width RFC3339 UTC string. Fixed millisecond
/// precision keeps lexicographic order equal to chronological order, which
/// the store's ordered queries depend on.
pub fn server_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
