//! Axum HTTP handlers for the CV site API
//!
//! Each handler is a single validate-then-store-or-fetch round trip; there is
//! no shared state between requests beyond the injected store client.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{self, analytics, contact, stats};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ContactAccepted {
    pub success: bool,
    pub message: &'static str,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsAccepted {
    pub success: bool,
}

/// Peer metadata captured into stored records. Extraction never fails:
/// absent headers and a missing socket address degrade to placeholders.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub origin_address: String,
    pub client_agent: String,
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let forwarded_for = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let client_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("Unknown")
            .to_string();

        Ok(Self {
            origin_address: origin_address(forwarded_for, peer),
            client_agent,
        })
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: domain::server_timestamp(),
    })
}

/// Returns the CV document from local storage verbatim. Read and parsed per
/// request; a failure is surfaced once, never retried.
pub async fn cv_data(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let raw = tokio::fs::read(&*state.cv_data_path)
        .await
        .map_err(|err| AppError::internal(format!("failed to read CV data file: {err}")))?;
    let data: Value = serde_json::from_slice(&raw)
        .map_err(|err| AppError::internal(format!("CV data file is not valid JSON: {err}")))?;
    Ok(Json(data))
}

pub async fn submit_contact(
    State(state): State<AppState>,
    meta: RequestMeta,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: contact::ContactPayload = serde_json::from_slice(&body)
        .map_err(|_| AppError::bad_request("invalid_json", "request body must be a JSON object"))?;

    let submission = contact::build_submission(
        payload,
        domain::server_timestamp(),
        meta.origin_address,
        meta.client_agent,
    )?;
    let document = serde_json::to_value(&submission)
        .map_err(|err| AppError::internal(format!("failed to serialize submission: {err}")))?;
    let id = state.store.add(domain::CONTACTS_COLLECTION, &document).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactAccepted {
            success: true,
            message: "Thank you for your message! I will get back to you soon.",
            id,
        }),
    ))
}

pub async fn track_analytics(
    State(state): State<AppState>,
    meta: RequestMeta,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    // Beacons may arrive with no body at all; every field has a default.
    let payload: analytics::AnalyticsPayload = if body.is_empty() {
        analytics::AnalyticsPayload::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| {
            AppError::bad_request("invalid_json", "request body must be a JSON object")
        })?
    };

    let event = analytics::build_event(
        payload,
        domain::server_timestamp(),
        meta.origin_address,
        meta.client_agent,
    );
    let document = serde_json::to_value(&event)
        .map_err(|err| AppError::internal(format!("failed to serialize event: {err}")))?;
    state
        .store
        .add(domain::ANALYTICS_COLLECTION, &document)
        .await?;

    Ok((StatusCode::CREATED, Json(AnalyticsAccepted { success: true })))
}

pub async fn site_stats(
    State(state): State<AppState>,
) -> Result<Json<stats::StatsResponse>, AppError> {
    let total_contacts = state.store.count(domain::CONTACTS_COLLECTION).await?;
    let total_page_views = state.store.count(domain::ANALYTICS_COLLECTION).await?;
    let recent = state
        .store
        .recent(
            domain::CONTACTS_COLLECTION,
            domain::SUBMITTED_AT_FIELD,
            stats::RECENT_CONTACTS_LIMIT,
        )
        .await?;

    Ok(Json(stats::StatsResponse {
        total_contacts,
        total_page_views,
        recent_contacts: recent.iter().map(stats::project_recent_contact).collect(),
    }))
}

pub async fn not_found() -> AppError {
    AppError::not_found("not_found", "resource not found")
}

fn origin_address(forwarded_for: Option<&str>, peer: Option<String>) -> String {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::origin_address;

    #[test]
    fn forwarded_header_wins_over_peer() {
        assert_eq!(
            origin_address(Some("203.0.113.9"), Some("10.0.0.1".to_string())),
            "203.0.113.9"
        );
    }

    #[test]
    fn first_forwarded_entry_is_used() {
        assert_eq!(
            origin_address(Some("203.0.113.9, 10.0.0.2, 10.0.0.3"), None),
            "203.0.113.9"
        );
    }

    #[test]
    fn blank_forwarded_header_falls_back_to_peer() {
        assert_eq!(
            origin_address(Some("   "), Some("10.0.0.1".to_string())),
            "10.0.0.1"
        );
    }

    #[test]
    fn no_source_degrades_to_placeholder() {
        assert_eq!(origin_address(None, None), "unknown");
    }
}
