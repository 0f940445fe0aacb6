//! Sources of introspection payloads.

use crate::fs::FileSystem;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub type ProviderFuture = Pin<Box<dyn Future<Output = Result<Value, ProviderError>> + Send>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidJson(err.to_string())
        } else {
            ProviderError::Request(err.to_string())
        }
    }
}

/// Runs an introspection query somewhere and returns the raw JSON response.
pub trait IntrospectionProvider: Send + Sync {
    fn fetch(&self, query: &str) -> ProviderFuture;
}

/// Already-fetched payload, returned as is on every call.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    payload: Value,
}

impl StaticProvider {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

impl IntrospectionProvider for StaticProvider {
    fn fetch(&self, _query: &str) -> ProviderFuture {
        let payload = self.payload.clone();
        Box::pin(async move { Ok(payload) })
    }
}

/// Re-reads a saved introspection result on every fetch.
#[derive(Clone)]
pub struct FileProvider {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }
}

impl IntrospectionProvider for FileProvider {
    fn fetch(&self, _query: &str) -> ProviderFuture {
        let path = self.path.clone();
        let fs = Arc::clone(&self.fs);
        Box::pin(async move {
            let display = path.display().to_string();
            let content = tokio::task::spawn_blocking(move || fs.read_to_string(&path))
                .await
                .map_err(|e| ProviderError::Read {
                    path: display.clone(),
                    message: e.to_string(),
                })?
                .map_err(|e| ProviderError::Read {
                    path: display,
                    message: e.to_string(),
                })?;
            serde_json::from_str(&content).map_err(|e| ProviderError::InvalidJson(e.to_string()))
        })
    }
}

/// POSTs the query to a GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    url: String,
    headers: BTreeMap<String, String>,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_headers(url, BTreeMap::new())
    }

    pub fn with_headers(url: impl Into<String>, headers: BTreeMap<String, String>) -> Self {
        Self {
            url: url.into(),
            headers,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl IntrospectionProvider for HttpProvider {
    fn fetch(&self, query: &str) -> ProviderFuture {
        let mut request = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(&json!({ "query": query }));
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }
        let url = self.url.clone();

        Box::pin(async move {
            debug!(%url, "sending introspection query");
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(response.json::<Value>().await?)
        })
    }
}
