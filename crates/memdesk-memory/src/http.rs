//! HTTP client for a hosted memory service with a mem0-style REST API.

use crate::error::MemoryError;
use crate::model::{MemoryHit, MemoryRecord, NewMemory, UserId};
use crate::search::SearchOptions;
use crate::store::MemoryStore;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Value, json};
use std::time::Duration;

const MEMORIES_PATH: &str = "v1/memories/";
const SEARCH_PATH: &str = "v1/memories/search/";

/// Connection options for [`HttpMemoryStore`].
#[derive(Debug, Clone)]
pub struct HttpMemoryStoreOptions {
    /// Base URL of the memory service.
    pub url: String,
    /// API key sent as `Authorization: Token <key>`.
    pub api_key: String,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
}

/// Remote memory store speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMemoryStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpMemoryStore {
    pub fn new(options: HttpMemoryStoreOptions) -> Result<Self, MemoryError> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let base_url = format!("{}/", options.url.trim_end_matches('/'));
        info!("initialized http memory store (url={base_url})");
        Ok(Self {
            client,
            base_url,
            api_key: options.api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Token {}", self.api_key))
    }

    /// Turn a non-2xx response into [`MemoryError::Status`].
    async fn check_status(response: Response) -> Result<Response, MemoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(MemoryError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json(response: Response) -> Result<Value, MemoryError> {
        let body = Self::check_status(response).await?.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|err| MemoryError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl MemoryStore for HttpMemoryStore {
    async fn add(&self, memory: NewMemory) -> Result<(), MemoryError> {
        let body = json!({
            "messages": [{
                "role": memory.metadata.role.as_str(),
                "content": memory.content,
            }],
            "user_id": memory.user_id.as_str(),
            "metadata": memory.metadata,
            "infer": false,
        });
        let request = self.client.post(self.endpoint(MEMORIES_PATH)).json(&body);
        let response = self.authorized(request).send().await?;
        // Services differ in what they echo back on a write; the status is enough.
        Self::check_status(response).await?;
        debug!(
            "stored remote memory (user_id={}, role={})",
            memory.user_id,
            memory.metadata.role.as_str()
        );
        Ok(())
    }

    async fn search(
        &self,
        user_id: &UserId,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<MemoryHit>, MemoryError> {
        let body = json!({
            "query": query,
            "user_id": user_id.as_str(),
            "limit": options.limit,
        });
        let request = self.client.post(self.endpoint(SEARCH_PATH)).json(&body);
        let response = self.authorized(request).send().await?;
        let value = Self::read_json(response).await?;
        let hits = parse_results(&value, user_id)?
            .into_iter()
            .map(|(record, score)| MemoryHit { record, score })
            .collect();
        Ok(options.apply(hits))
    }

    async fn get_all(&self, user_id: &UserId) -> Result<Vec<MemoryRecord>, MemoryError> {
        let request = self
            .client
            .get(self.endpoint(MEMORIES_PATH))
            .query(&[("user_id", user_id.as_str())]);
        let response = self.authorized(request).send().await?;
        let value = Self::read_json(response).await?;
        Ok(parse_results(&value, user_id)?
            .into_iter()
            .map(|(record, _)| record)
            .collect())
    }
}

/// Extract records from `{results: [...]}` or a bare array.
///
/// Entries without a string `memory` field are skipped. Entries tagged with a
/// different owner are dropped.
fn parse_results(
    value: &Value,
    user_id: &UserId,
) -> Result<Vec<(MemoryRecord, Option<f32>)>, MemoryError> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(MemoryError::Malformed(
                    "expected `results` array".to_string(),
                ));
            }
        },
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(MemoryError::Malformed(
                "expected object or array".to_string(),
            ));
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(content) = entry.get("memory").and_then(Value::as_str) else {
            debug!("skipping memory entry without text");
            continue;
        };
        let owner = entry.get("user_id").and_then(Value::as_str);
        if owner.is_some_and(|owner| owner != user_id.as_str()) {
            warn!("discarding memory entry owned by another user (requested={user_id})");
            continue;
        }
        let id = match entry.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };
        let created_at = entry
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&chrono::Utc));
        let score = entry
            .get("score")
            .and_then(Value::as_f64)
            .map(|score| score as f32);
        records.push((
            MemoryRecord {
                id,
                user_id: user_id.to_string(),
                content: content.to_string(),
                metadata: entry.get("metadata").cloned().unwrap_or(Value::Null),
                created_at,
            },
            score,
        ));
    }
    Ok(records)
}
