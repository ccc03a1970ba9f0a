//! Document store client for the Firestore REST API
//!
//! Handlers treat the store as an opaque collaborator behind the
//! [`DocumentStore`] trait so tests can substitute an in-memory fake.
//! Documents are flat JSON objects; this module maps them to and from
//! Firestore's typed value encoding.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::errors::AppError;

const PUBLIC_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const LIST_PAGE_SIZE: u32 = 300;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends a document to a collection; the store assigns and returns the
    /// new document's id.
    async fn add(&self, collection: &str, document: &Value) -> Result<String, AppError>;

    /// Total number of documents in a collection, obtained by scanning it.
    async fn count(&self, collection: &str) -> Result<u64, AppError>;

    /// Up to `limit` documents ordered by `order_field` descending.
    async fn recent(
        &self,
        collection: &str,
        order_field: &str,
        limit: u32,
    ) -> Result<Vec<Value>, AppError>;
}

enum TokenSource {
    None,
    Static(String),
    MetadataServer,
}

pub struct FirestoreStore {
    client: Client,
    base_url: String,
    parent_path: String,
    token_source: TokenSource,
}

impl FirestoreStore {
    pub fn new(config: &Config) -> Self {
        let base_url = match &config.emulator_host {
            Some(host) => format!("http://{host}/v1"),
            None => PUBLIC_ENDPOINT.to_string(),
        };
        let token_source = if config.emulator_host.is_some() {
            TokenSource::None
        } else if let Some(token) = &config.access_token {
            TokenSource::Static(token.clone())
        } else {
            TokenSource::MetadataServer
        };

        Self {
            client: Client::new(),
            base_url,
            parent_path: format!(
                "projects/{}/databases/(default)/documents",
                config.project_id
            ),
            token_source,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}/{collection}", self.base_url, self.parent_path)
    }

    /// Bearer token for the public endpoint. The metadata server is asked per
    /// request; tokens are not cached.
    async fn bearer_token(&self) -> Result<Option<String>, AppError> {
        match &self.token_source {
            TokenSource::None => Ok(None),
            TokenSource::Static(token) => Ok(Some(token.clone())),
            TokenSource::MetadataServer => {
                #[derive(Deserialize)]
                struct TokenResponse {
                    access_token: String,
                }

                let response = self
                    .client
                    .get(METADATA_TOKEN_URL)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|err| {
                        AppError::store(format!("metadata token request failed: {err}"))
                    })?;
                if !response.status().is_success() {
                    return Err(AppError::store(format!(
                        "metadata token request returned {}",
                        response.status()
                    )));
                }
                let token: TokenResponse = response.json().await.map_err(|err| {
                    AppError::store(format!("metadata token response malformed: {err}"))
                })?;
                Ok(Some(token.access_token))
            }
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, AppError> {
        let request = match self.bearer_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|err| AppError::store(format!("store request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::store(format!("store returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|err| AppError::store(format!("store response malformed: {err}")))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn add(&self, collection: &str, document: &Value) -> Result<String, AppError> {
        let body = json!({ "fields": encode_fields(document)? });
        let response = self
            .send(self.client.post(self.collection_url(collection)).json(&body))
            .await?;

        let name = response
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::store("store response missing document name".to_string()))?;
        Ok(document_id(name).to_string())
    }

    async fn count(&self, collection: &str) -> Result<u64, AppError> {
        // Full scan via paginated listing; the REST API has no cheap count.
        let mut total: u64 = 0;
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.collection_url(collection))
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = self.send(request).await?;
            if let Some(documents) = response.get("documents").and_then(Value::as_array) {
                total += documents.len() as u64;
            }

            match response.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => return Ok(total),
            }
        }
    }

    async fn recent(
        &self,
        collection: &str,
        order_field: &str,
        limit: u32,
    ) -> Result<Vec<Value>, AppError> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": order_field },
                    "direction": "DESCENDING",
                }],
                "limit": limit,
            }
        });
        let url = format!("{}/{}:runQuery", self.base_url, self.parent_path);
        let response = self.send(self.client.post(url).json(&query)).await?;

        // runQuery streams one entry per result; entries carrying only a
        // readTime have no document.
        let mut documents = Vec::new();
        for entry in response.as_array().cloned().unwrap_or_default() {
            if let Some(fields) = entry.pointer("/document/fields") {
                documents.push(decode_fields(fields)?);
            }
        }
        Ok(documents)
    }
}

fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn encode_fields(document: &Value) -> Result<Value, AppError> {
    let Some(object) = document.as_object() else {
        return Err(AppError::store(
            "stored documents must be JSON objects".to_string(),
        ));
    };

    let mut fields = Map::new();
    for (key, value) in object {
        fields.insert(key.clone(), encode_value(value));
    }
    Ok(Value::Object(fields))
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            // Firestore serializes 64-bit integers as strings.
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64() }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(entries) => {
            let mut fields = Map::new();
            for (key, value) in entries {
                fields.insert(key.clone(), encode_value(value));
            }
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn decode_fields(fields: &Value) -> Result<Value, AppError> {
    let Some(entries) = fields.as_object() else {
        return Err(AppError::store(
            "document fields must be a JSON object".to_string(),
        ));
    };

    let mut document = Map::new();
    for (key, value) in entries {
        document.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(document))
}

fn decode_value(value: &Value) -> Result<Value, AppError> {
    let Some((kind, inner)) = value.as_object().and_then(|entry| entry.iter().next()) else {
        return Err(AppError::store(
            "store value must be a single-kind object".to_string(),
        ));
    };

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => match inner.as_str().and_then(|text| text.parse::<i64>().ok()) {
            Some(integer) => Value::from(integer),
            None => inner.clone(),
        },
        "stringValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "arrayValue" => {
            let mut items = Vec::new();
            if let Some(values) = inner.get("values").and_then(Value::as_array) {
                for item in values {
                    items.push(decode_value(item)?);
                }
            }
            Value::Array(items)
        }
        "mapValue" => {
            let empty = Value::Object(Map::new());
            decode_fields(inner.get("fields").unwrap_or(&empty))?
        }
        other => {
            return Err(AppError::store(format!(
                "unsupported store value kind: {other}"
            )))
        }
    };
    Ok(decoded)
}
