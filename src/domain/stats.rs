use serde::Serialize;
use serde_json::Value;

pub const RECENT_CONTACTS_LIMIT: u32 = 10;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_contacts: u64,
    pub total_page_views: u64,
    pub recent_contacts: Vec<RecentContact>,
}

/// Public view of a contact submission. Email, origin address and user agent
/// never leave the store through this projection.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RecentContact {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub submitted_at: Option<String>,
}

pub fn project_recent_contact(document: &Value) -> RecentContact {
    RecentContact {
        name: string_field(document, "name"),
        subject: string_field(document, "subject"),
        submitted_at: string_field(document, "submitted_at"),
    }
}

fn string_field(document: &Value, field: &str) -> Option<String> {
    document
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}
