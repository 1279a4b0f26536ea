use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{domain::Taxpayer, error::ApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("tid '{0}' is already registered")]
    DuplicateTid(String),
    #[error("record rejected by service: {0}")]
    InvalidRecord(String),
}

/// The remote store boundary. Implementations perform one remote call per
/// method, with no retries; timeouts are the transport's concern.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Taxpayer>, StoreError>;
    async fn create(&self, record: &Taxpayer) -> Result<(), StoreError>;
    /// Zero or one match, expressed as a sequence for interface uniformity
    /// with `list_all`.
    async fn find_by_tid(&self, tid: &str) -> Result<Vec<Taxpayer>, StoreError>;
}

/// Talks to the taxpayer registry service over HTTP.
pub struct HttpRecordStore {
    http: Client,
    server_url: String,
}

impl HttpRecordStore {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }

    async fn api_message(response: reqwest::Response) -> String {
        match response.json::<ApiError>().await {
            Ok(err) => err.message,
            Err(err) => format!("unreadable error body: {err}"),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_all(&self) -> Result<Vec<Taxpayer>, StoreError> {
        let response = self
            .http
            .get(format!("{}/taxpayers", self.server_url))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(StoreError::ServiceUnavailable(format!(
                "list failed with status {}",
                response.status()
            )));
        }
        response.json().await.map_err(transport)
    }

    async fn create(&self, record: &Taxpayer) -> Result<(), StoreError> {
        let response = self
            .http
            .post(format!("{}/taxpayers", self.server_url))
            .json(record)
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(StoreError::DuplicateTid(record.tid.clone())),
            StatusCode::BAD_REQUEST => {
                Err(StoreError::InvalidRecord(Self::api_message(response).await))
            }
            status => Err(StoreError::ServiceUnavailable(format!(
                "create failed with status {status}"
            ))),
        }
    }

    async fn find_by_tid(&self, tid: &str) -> Result<Vec<Taxpayer>, StoreError> {
        let response = self
            .http
            .get(format!("{}/taxpayers/{tid}", self.server_url))
            .send()
            .await
            .map_err(transport)?;
        // The service answers a miss with 404; to the controller that is a
        // valid empty result, not a failure.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(StoreError::ServiceUnavailable(format!(
                "find failed with status {}",
                response.status()
            )));
        }
        let record: Taxpayer = response.json().await.map_err(transport)?;
        Ok(vec![record])
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::ServiceUnavailable(err.to_string())
}
