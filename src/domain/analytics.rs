use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Analytics ping body. All fields optional; viewport dimensions are kept as
/// raw JSON values so malformed input is stored exactly as received.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsPayload {
    pub page: Option<String>,
    pub referrer: Option<String>,
    pub screen_width: Option<Value>,
    pub screen_height: Option<Value>,
}

/// Stored page-view event. Write-only; only ever read back in aggregate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsEvent {
    pub page: String,
    pub occurred_at: String,
    pub origin_address: String,
    pub client_agent: String,
    pub referrer: String,
    pub viewport_width: Option<Value>,
    pub viewport_height: Option<Value>,
}

pub fn build_event(
    payload: AnalyticsPayload,
    occurred_at: String,
    origin_address: String,
    client_agent: String,
) -> AnalyticsEvent {
    AnalyticsEvent {
        page: payload.page.unwrap_or_else(|| "/".to_string()),
        occurred_at,
        origin_address,
        client_agent,
        referrer: payload.referrer.unwrap_or_default(),
        viewport_width: payload.screen_width,
        viewport_height: payload.screen_height,
    }
}
