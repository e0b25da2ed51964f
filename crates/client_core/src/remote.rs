//! HTTP access to the remote catalog service.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::domain::{Book, BookFields, BookId};

use crate::error::ClientError;

/// The four catalog operations the controller depends on. Implemented over
/// HTTP by [`RemoteBookClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait BookService: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, ClientError>;
    async fn create(&self, fields: BookFields) -> Result<Book, ClientError>;
    async fn update(&self, id: BookId, fields: BookFields) -> Result<Book, ClientError>;
    async fn delete(&self, id: BookId) -> Result<(), ClientError>;
}

/// Pure request/response client against the catalog REST service. No retry,
/// no caching, no local validation, no state beyond the configured base URL.
pub struct RemoteBookClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Clone, Copy)]
enum CallKind {
    List,
    Create,
    Update,
    Delete,
}

impl CallKind {
    /// Calls addressing one record by id, where a 404 means the id is gone.
    fn targets_record(self) -> bool {
        matches!(self, CallKind::Update | CallKind::Delete)
    }

    /// Calls carrying a payload the server may reject.
    fn writes_payload(self) -> bool {
        matches!(self, CallKind::Create | CallKind::Update)
    }
}

impl RemoteBookClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    async fn failure(response: Response, call: CallKind) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        classify(status, body, call)
    }
}

fn classify(status: StatusCode, body: String, call: CallKind) -> ClientError {
    if call.targets_record() && status == StatusCode::NOT_FOUND {
        ClientError::NotFound
    } else if call.writes_payload() && status.is_client_error() {
        ClientError::Validation {
            status: status.as_u16(),
            body,
        }
    } else {
        ClientError::Server {
            status: status.as_u16(),
            body,
        }
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

#[async_trait]
impl BookService for RemoteBookClient {
    async fn list(&self) -> Result<Vec<Book>, ClientError> {
        let response = self
            .http
            .get(format!("{}/books", self.base_url))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, CallKind::List).await);
        }
        response.json().await.map_err(transport)
    }

    async fn create(&self, fields: BookFields) -> Result<Book, ClientError> {
        let response = self
            .http
            .post(format!("{}/books", self.base_url))
            .json(&fields)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, CallKind::Create).await);
        }
        response.json().await.map_err(transport)
    }

    async fn update(&self, id: BookId, fields: BookFields) -> Result<Book, ClientError> {
        let response = self
            .http
            .put(format!("{}/books/{}", self.base_url, id.0))
            .json(&fields)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, CallKind::Update).await);
        }
        response.json().await.map_err(transport)
    }

    async fn delete(&self, id: BookId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/books/{}", self.base_url, id.0))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, CallKind::Delete).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
